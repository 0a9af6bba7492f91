//! GitHub Discussions of a repository (GraphQL)
//!
//! Discussions are only reachable through the GraphQL API, so this view
//! requires a token. Listing discussion numbers pages through the
//! `discussions` connection; resolving one number fetches the discussion
//! directly and accumulates every comment and every reply.
//!
//! Comments and replies page independently. A comment whose replies span
//! several pages has the remaining pages fetched through its node id, without
//! re-issuing the outer discussion query.

use std::fmt;

use serde::Deserialize;
use serde_json::json;

use super::collection::{EnumeratedCollectionView, keyed_by};
use super::repository::RepositoryHandle;
use super::LazyKeyedView;
use crate::github::models::Actor;
use crate::github::pagination::{Connection, paginate};
use crate::github::{
    Discussion, DiscussionComment, DiscussionReply, GithubClient, HubError, Result,
};

const DISCUSSION_NUMBERS_QUERY: &str = r#"
query($owner: String!, $name: String!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    discussions(first: 100, after: $cursor) {
      pageInfo { hasNextPage endCursor }
      nodes { number }
    }
  }
}
"#;

const DISCUSSION_QUERY: &str = r#"
query($owner: String!, $name: String!, $number: Int!, $commentsCursor: String) {
  repository(owner: $owner, name: $name) {
    discussion(number: $number) {
      number
      title
      body
      url
      createdAt
      updatedAt
      author { login }
      comments(first: 100, after: $commentsCursor) {
        pageInfo { hasNextPage endCursor }
        nodes {
          id
          body
          createdAt
          author { login }
          replies(first: 100) {
            pageInfo { hasNextPage endCursor }
            nodes { body createdAt author { login } }
          }
        }
      }
    }
  }
}
"#;

const REPLIES_QUERY: &str = r#"
query($commentId: ID!, $repliesCursor: String) {
  node(id: $commentId) {
    ... on DiscussionComment {
      replies(first: 100, after: $repliesCursor) {
        pageInfo { hasNextPage endCursor }
        nodes { body createdAt author { login } }
      }
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
struct RepositoryData<T> {
    repository: Option<T>,
}

#[derive(Debug, Deserialize)]
struct DiscussionsField {
    discussions: Connection<NumberNode>,
}

#[derive(Debug, Deserialize)]
struct NumberNode {
    number: u64,
}

#[derive(Debug, Deserialize)]
struct DiscussionField {
    discussion: Option<DiscussionNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscussionNode {
    number: u64,
    title: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    author: Option<Actor>,
    comments: Connection<CommentNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentNode {
    id: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    author: Option<Actor>,
    replies: Connection<ReplyNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplyNode {
    #[serde(default)]
    body: String,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    author: Option<Actor>,
}

impl From<ReplyNode> for DiscussionReply {
    fn from(node: ReplyNode) -> Self {
        DiscussionReply {
            body: node.body,
            author: node.author.map(|a| a.login),
            created_at: node.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NodeData {
    node: Option<RepliesField>,
}

#[derive(Debug, Deserialize)]
struct RepliesField {
    replies: Option<Connection<ReplyNode>>,
}

/// Every discussion number of the repository, in remote order
fn list_numbers(repo: &RepositoryHandle) -> Result<Vec<u64>> {
    let nodes = paginate(None, |cursor| {
        let data = repo.client().graphql(
            DISCUSSION_NUMBERS_QUERY,
            json!({
                "owner": repo.owner(),
                "name": repo.name(),
                "cursor": cursor,
            }),
        )?;
        let data: RepositoryData<DiscussionsField> = serde_json::from_value(data)?;
        data.repository
            .map(|r| r.discussions)
            .ok_or_else(|| HubError::not_found(format!("repository {}", repo.full_name())))
    })?;
    tracing::debug!("{}: {} discussion(s)", repo.full_name(), nodes.len());
    Ok(nodes.into_iter().map(|n| n.number).collect())
}

/// Fetches one discussion with all of its comments and replies
///
/// # Returns
///
/// The accumulated [`Discussion`], or [`HubError::NotFound`] when the
/// repository has no discussion with that number.
fn fetch_discussion(repo: &RepositoryHandle, number: u64) -> Result<Discussion> {
    let fetch_page = |cursor: Option<String>| -> Result<DiscussionNode> {
        let data = repo.client().graphql(
            DISCUSSION_QUERY,
            json!({
                "owner": repo.owner(),
                "name": repo.name(),
                "number": number,
                "commentsCursor": cursor,
            }),
        )?;
        let data: RepositoryData<DiscussionField> = serde_json::from_value(data)?;
        data.repository
            .and_then(|r| r.discussion)
            .ok_or_else(|| {
                HubError::not_found(format!("discussion #{} of {}", number, repo.full_name()))
            })
    };

    let first = fetch_page(None)?;
    let DiscussionNode {
        number,
        title,
        body,
        url,
        created_at,
        updated_at,
        author,
        comments,
    } = first;

    let comment_nodes = paginate(Some(comments), |cursor| Ok(fetch_page(cursor)?.comments))?;
    let comments = comment_nodes
        .into_iter()
        .map(|node| accumulate_replies(repo.client(), node))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        "{}#{}: {} comment(s), {} repl(ies)",
        repo.full_name(),
        number,
        comments.len(),
        comments.iter().map(|c| c.replies.len()).sum::<usize>()
    );

    Ok(Discussion {
        number,
        title,
        body,
        url,
        author: author.map(|a| a.login),
        created_at,
        updated_at,
        comments,
    })
}

fn accumulate_replies(client: &GithubClient, node: CommentNode) -> Result<DiscussionComment> {
    let CommentNode {
        id,
        body,
        created_at,
        author,
        replies,
    } = node;

    let replies = paginate(Some(replies), |cursor| fetch_replies(client, &id, cursor))?;

    Ok(DiscussionComment {
        id,
        body,
        author: author.map(|a| a.login),
        created_at,
        replies: replies.into_iter().map(DiscussionReply::from).collect(),
    })
}

fn fetch_replies(
    client: &GithubClient,
    comment_id: &str,
    cursor: Option<String>,
) -> Result<Connection<ReplyNode>> {
    let data = client.graphql(
        REPLIES_QUERY,
        json!({
            "commentId": comment_id,
            "repliesCursor": cursor,
        }),
    )?;
    let data: NodeData = serde_json::from_value(data)?;
    data.node
        .and_then(|node| node.replies)
        .ok_or_else(|| HubError::not_found(format!("discussion comment {}", comment_id)))
}

/// Discussions keyed by number, resolving to fully accumulated [`Discussion`]s
///
/// # Examples
///
/// ```no_run
/// use hubcap::github::{ClientConfig, GithubClient, RepoSpec};
/// use hubcap::views::{DiscussionCollectionView, LazyKeyedView, RepositoryHandle};
///
/// let client = GithubClient::new(ClientConfig::from_env()).unwrap();
/// let repo = RepositoryHandle::resolve(&client, &RepoSpec::new("acme", "widget")).unwrap();
/// let discussions = DiscussionCollectionView::new(repo).unwrap();
/// let discussion = discussions.get(&42).unwrap();
/// println!("{}: {} comment(s)", discussion.title, discussion.comments.len());
/// ```
pub struct DiscussionCollectionView {
    view: EnumeratedCollectionView<RepositoryHandle, u64, u64, Discussion>,
}

impl DiscussionCollectionView {
    /// Fails with a configuration error when the client has no token
    pub fn new(repo: RepositoryHandle) -> Result<Self> {
        repo.client().require_token("discussions")?;
        let label = format!("{} discussions", repo.full_name());
        let value_repo = repo.clone();
        let view = EnumeratedCollectionView::new(
            label,
            repo,
            list_numbers,
            keyed_by(|number: &u64| Ok(*number)),
            move |number: &u64| fetch_discussion(&value_repo, *number),
        )
        .with_fetcher(|_: &RepositoryHandle, number: &u64| Ok(*number));
        Ok(Self { view })
    }

    pub fn repository(&self) -> &RepositoryHandle {
        self.view.parent()
    }
}

impl LazyKeyedView for DiscussionCollectionView {
    type Key = u64;
    type Value = Discussion;

    fn keys(&self) -> Result<Vec<u64>> {
        self.view.keys()
    }

    /// Fetches the discussion directly unless the number listing is memoized,
    /// in which case numbers outside it are not found without a request
    fn get(&self, number: &u64) -> Result<Discussion> {
        self.view.get(number)
    }
}

impl fmt::Debug for DiscussionCollectionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DiscussionCollectionView")
            .field(&self.view)
            .finish()
    }
}
