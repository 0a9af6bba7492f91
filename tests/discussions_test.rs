//! Tests for discussions over a mock GraphQL endpoint
//!
//! These tests verify:
//! 1. Comments spanning several pages are all accumulated, without duplicates
//! 2. Reply pages are fetched per comment without re-issuing the outer query
//! 3. Missing discussions are not found; other GraphQL errors are protocol errors

mod common;

use std::collections::HashSet;

use serde_json::{Value, json};

use hubcap::github::RepoSpec;
use hubcap::views::{DiscussionCollectionView, LazyKeyedView, RepositoryHandle};

fn widget(server: &mut mockito::ServerGuard) -> RepositoryHandle {
    let _repo = common::mock_repo(server, "acme", "widget");
    RepositoryHandle::resolve(&common::client(server), &RepoSpec::new("acme", "widget")).unwrap()
}

fn page_info(next: Option<&str>) -> Value {
    json!({"hasNextPage": next.is_some(), "endCursor": next})
}

fn reply(body: &str) -> Value {
    json!({"body": body, "createdAt": "2024-01-01T00:00:00Z", "author": {"login": "replier"}})
}

fn comment(id: &str, replies: Vec<Value>, replies_next: Option<&str>) -> Value {
    json!({
        "id": id,
        "body": format!("comment {}", id),
        "createdAt": "2024-01-01T00:00:00Z",
        "author": {"login": "commenter"},
        "replies": {"pageInfo": page_info(replies_next), "nodes": replies}
    })
}

fn discussion_page(comments: Vec<Value>, next: Option<&str>) -> Value {
    json!({
        "data": {
            "repository": {
                "discussion": {
                    "number": 42,
                    "title": "Roadmap",
                    "body": "What next?",
                    "url": "https://github.com/acme/widget/discussions/42",
                    "createdAt": "2024-01-01T00:00:00Z",
                    "updatedAt": "2024-01-02T00:00:00Z",
                    "author": {"login": "octocat"},
                    "comments": {"pageInfo": page_info(next), "nodes": comments}
                }
            }
        }
    })
}

fn comment_page(start: usize) -> Vec<Value> {
    (start..start + 100)
        .map(|i| comment(&format!("DC_{}", i), Vec::new(), None))
        .collect()
}

#[test]
fn test_three_comment_pages_are_accumulated() {
    let mut server = mockito::Server::new();
    let repo = widget(&mut server);

    let first = common::graphql(
        &mut server,
        r#"discussion\(number.*"commentsCursor":null"#,
        &discussion_page(comment_page(0), Some("cursor-1")),
    )
    .expect(1)
    .create();
    let second = common::graphql(
        &mut server,
        r#"discussion\(number.*"commentsCursor":"cursor-1""#,
        &discussion_page(comment_page(100), Some("cursor-2")),
    )
    .expect(1)
    .create();
    let third = common::graphql(
        &mut server,
        r#"discussion\(number.*"commentsCursor":"cursor-2""#,
        &discussion_page(comment_page(200), None),
    )
    .expect(1)
    .create();

    let discussions = DiscussionCollectionView::new(repo).unwrap();
    let discussion = discussions.get(&42).unwrap();

    assert_eq!(discussion.title, "Roadmap");
    assert_eq!(discussion.author.as_deref(), Some("octocat"));
    assert_eq!(discussion.comments.len(), 300);
    let ids: HashSet<&str> = discussion.comments.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids.len(), 300);
    assert_eq!(discussion.comments[0].id, "DC_0");
    assert_eq!(discussion.comments[299].id, "DC_299");

    first.assert();
    second.assert();
    third.assert();
}

#[test]
fn test_reply_pages_use_comment_cursor_only() {
    let mut server = mockito::Server::new();
    let repo = widget(&mut server);

    let outer = common::graphql(
        &mut server,
        r#"discussion\(number"#,
        &discussion_page(
            vec![
                comment("DC_a", vec![reply("first")], Some("reply-cursor-1")),
                comment("DC_b", vec![reply("only")], None),
            ],
            None,
        ),
    )
    .expect(1)
    .create();
    let more_replies = common::graphql(
        &mut server,
        r#"node\(id.*"commentId":"DC_a".*"repliesCursor":"reply-cursor-1""#,
        &json!({
            "data": {
                "node": {
                    "replies": {
                        "pageInfo": page_info(None),
                        "nodes": [reply("second"), reply("third")]
                    }
                }
            }
        }),
    )
    .expect(1)
    .create();

    let discussions = DiscussionCollectionView::new(repo).unwrap();
    let discussion = discussions.get(&42).unwrap();

    let bodies: Vec<&str> = discussion.comments[0]
        .replies
        .iter()
        .map(|r| r.body.as_str())
        .collect();
    assert_eq!(bodies, vec!["first", "second", "third"]);
    assert_eq!(discussion.comments[1].replies.len(), 1);
    assert_eq!(
        discussion.comments[0].replies[0].author.as_deref(),
        Some("replier")
    );

    outer.assert();
    more_replies.assert();
}

#[test]
fn test_missing_discussion_is_not_found() {
    let mut server = mockito::Server::new();
    let repo = widget(&mut server);
    let _missing = common::graphql(
        &mut server,
        r#"discussion\(number"#,
        &json!({
            "data": {"repository": {"discussion": null}},
            "errors": [{
                "type": "NOT_FOUND",
                "path": ["repository", "discussion"],
                "message": "Could not resolve to a Discussion with the number of 99."
            }]
        }),
    )
    .create();

    let discussions = DiscussionCollectionView::new(repo).unwrap();
    let err = discussions.get(&99).unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {}", err);
    assert!(!discussions.contains(&99).unwrap());
}

#[test]
fn test_null_discussion_without_errors_is_not_found() {
    let mut server = mockito::Server::new();
    let repo = widget(&mut server);
    let _missing = common::graphql(
        &mut server,
        r#"discussion\(number"#,
        &json!({"data": {"repository": {"discussion": null}}}),
    )
    .create();

    let discussions = DiscussionCollectionView::new(repo).unwrap();
    assert!(discussions.get(&99).unwrap_err().is_not_found());
}

#[test]
fn test_other_graphql_errors_are_protocol_errors() {
    let mut server = mockito::Server::new();
    let repo = widget(&mut server);
    let _broken = common::graphql(
        &mut server,
        r#"discussion\(number"#,
        &json!({
            "errors": [{"message": "Field 'bogus' doesn't exist on type 'Discussion'"}]
        }),
    )
    .create();

    let discussions = DiscussionCollectionView::new(repo).unwrap();
    let err = discussions.get(&42).unwrap_err();
    assert!(err.is_remote_protocol(), "unexpected error: {}", err);
    assert!(err.to_string().contains("bogus"));
    assert!(discussions.contains(&42).is_err());
}

#[test]
fn test_numbers_are_listed_once_across_pages() {
    let mut server = mockito::Server::new();
    let repo = widget(&mut server);

    let first = common::graphql(
        &mut server,
        r#"discussions\(first.*"cursor":null"#,
        &json!({"data": {"repository": {"discussions": {
            "pageInfo": page_info(Some("n-1")),
            "nodes": [{"number": 3}, {"number": 2}]
        }}}}),
    )
    .expect(1)
    .create();
    let second = common::graphql(
        &mut server,
        r#"discussions\(first.*"cursor":"n-1""#,
        &json!({"data": {"repository": {"discussions": {
            "pageInfo": page_info(None),
            "nodes": [{"number": 1}]
        }}}}),
    )
    .expect(1)
    .create();

    let discussions = DiscussionCollectionView::new(repo).unwrap();
    assert_eq!(discussions.keys().unwrap(), vec![3, 2, 1]);
    assert_eq!(discussions.keys().unwrap(), vec![3, 2, 1]);
    // Outside the memoized listing: not found without a request
    assert!(!discussions.contains(&7).unwrap());

    first.assert();
    second.assert();
}

#[test]
fn test_discussions_require_token() {
    let mut server = mockito::Server::new();
    let _repo = common::mock_repo(&mut server, "acme", "widget");
    let repo = RepositoryHandle::resolve(
        &common::anonymous_client(&server),
        &RepoSpec::new("acme", "widget"),
    )
    .unwrap();

    assert!(DiscussionCollectionView::new(repo).unwrap_err().is_configuration());
}
