//! Tests for issue collections against a mock GitHub
//!
//! These tests verify:
//! 1. Pull requests mixed into the issues listing are excluded
//! 2. The state filter reaches the request and bounds `get`
//! 3. Issue bodies and comments are reachable through the contents view

mod common;

use mockito::Matcher;
use serde_json::{Value, json};

use hubcap::github::{IssueState, RepoSpec};
use hubcap::views::{
    IssueCollectionView, IssueContent, LazyKeyedView, RepositoryHandle,
};

fn widget(server: &mut mockito::ServerGuard) -> RepositoryHandle {
    let _repo = common::mock_repo(server, "acme", "widget");
    RepositoryHandle::resolve(&common::client(server), &RepoSpec::new("acme", "widget")).unwrap()
}

fn issue(number: u64, title: &str, state: &str) -> Value {
    json!({
        "id": number * 1000,
        "number": number,
        "title": title,
        "body": format!("Body of {}", title),
        "state": state,
        "user": {"login": "octocat"},
        "labels": [{"name": "bug", "color": "d73a4a"}],
        "comments": 2,
        "html_url": format!("https://github.com/acme/widget/issues/{}", number)
    })
}

fn pull_request(number: u64) -> Value {
    let mut pr = issue(number, "Add feature", "open");
    pr["pull_request"] = json!({"url": format!("https://api.github.com/repos/acme/widget/pulls/{}", number)});
    pr
}

fn mock_issues(server: &mut mockito::ServerGuard, state: &str, body: Value) -> mockito::Mock {
    server
        .mock("GET", "/repos/acme/widget/issues")
        .match_query(Matcher::UrlEncoded("state".into(), state.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
}

#[test]
fn test_keys_exclude_pull_requests() {
    let mut server = mockito::Server::new();
    let repo = widget(&mut server);
    let listing = mock_issues(
        &mut server,
        "open",
        json!([issue(4, "Crash on start", "open"), issue(5, "Typo", "open"), pull_request(6)]),
    )
    .expect(1)
    .create();

    let issues = IssueCollectionView::new(repo);
    assert_eq!(issues.keys().unwrap(), vec![4, 5]);

    let four = issues.get(&4).unwrap();
    assert_eq!(four.title, "Crash on start");
    assert_eq!(four.labels[0].name, "bug");
    assert!(issues.get(&6).unwrap_err().is_not_found());
    assert!(!issues.contains(&7).unwrap());

    listing.assert();
}

#[test]
fn test_state_filter_is_sent_and_applied() {
    let mut server = mockito::Server::new();
    let repo = widget(&mut server);
    let closed = mock_issues(&mut server, "closed", json!([issue(1, "Old bug", "closed")]))
        .expect(1)
        .create();
    let open = mock_issues(&mut server, "open", json!([]))
        .expect(0)
        .create();

    let issues = IssueCollectionView::with_state(repo, IssueState::Closed);
    assert_eq!(issues.state(), IssueState::Closed);
    assert_eq!(issues.keys().unwrap(), vec![1]);
    assert_eq!(issues.get(&1).unwrap().state, "closed");

    closed.assert();
    open.assert();
}

#[test]
fn test_issue_contents_and_comments() {
    let mut server = mockito::Server::new();
    let repo = widget(&mut server);
    let _listing = mock_issues(&mut server, "open", json!([issue(4, "Crash on start", "open")])).create();
    let comments = common::get_json(
        &mut server,
        "/repos/acme/widget/issues/4/comments",
        &json!([
            {"id": 1, "body": "Can reproduce", "user": {"login": "a"}},
            {"id": 2, "body": null, "user": {"login": "b"}},
        ]),
    )
    .expect(1)
    .create();

    let issues = IssueCollectionView::contents(repo, IssueState::Open);
    let contents = issues.get(&4).unwrap();
    assert_eq!(contents.keys().unwrap(), vec!["body", "comments"]);
    assert_eq!(contents.issue().number, 4);

    match contents.get(&"body".to_string()).unwrap() {
        IssueContent::Body(body) => assert_eq!(body, "Body of Crash on start"),
        other => panic!("expected body, got {:?}", other),
    }
    assert!(contents.get(&"title".to_string()).unwrap_err().is_not_found());

    let IssueContent::Comments(thread) = contents.get(&"comments".to_string()).unwrap() else {
        panic!("expected comments");
    };
    assert_eq!(thread.keys().unwrap(), vec![0, 1]);
    assert_eq!(thread.get(&0).unwrap(), "Can reproduce");
    assert_eq!(thread.get(&1).unwrap(), "");
    assert!(thread.get(&2).unwrap_err().is_not_found());
    assert_eq!(thread.comments().unwrap()[1].user.as_ref().unwrap().login, "b");

    comments.assert();
}
