//! Path routing
//!
//! [`PathRouter`] maps a path string onto the view chain:
//!
//! | Path                               | Resolves to                         |
//! |------------------------------------|-------------------------------------|
//! | `owner`                            | [`AccountView`]                     |
//! | `owner/repo`                       | [`RepositoryView`]                  |
//! | `owner/repo/<collection>/...`      | the collection view, then its items |
//! | `owner/repo/tree`                  | [`RepositoryBranchesView`]          |
//! | `owner/repo/tree/<branch>/<path>`  | [`BranchTreeView`] or a file value  |
//! | `owner/repo/<branch>/<path>`       | same as with `tree`                 |
//!
//! `blob` is accepted in place of `tree`, so browser URLs for files work too.
//! A collection name takes precedence over a branch with the same name.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::github::{
    Discussion, GithubClient, HubError, HubPath, RepoSpec, Result, parse_location,
};
use crate::views::{
    AccountView, BranchTreeView, ContentExtractor, DiscussionCollectionView, IssueCollectionView,
    IssueCommentsView, IssueContent, IssueContentsView, LazyKeyedView, RepoCollection,
    RepoCollectionValue, RepoObjectsView, RepositoryBranchesView, RepositoryHandle,
    RepositoryView, TreeValue, decoded_contents,
};

/// Segments that mark the start of `branch/path` in browser URLs
const ROUTE_MARKERS: [&str; 2] = ["tree", "blob"];

fn is_route_marker(segment: &str) -> bool {
    ROUTE_MARKERS.contains(&segment)
}

/// Whatever a path resolves to
///
/// Views stay lazy; navigating further with [`child`](Resolved::child) or
/// listing with [`keys`](Resolved::keys) is what touches the network.
pub enum Resolved<V = Vec<u8>> {
    Account(AccountView<V>),
    Repository(RepositoryView),
    Branches(RepositoryBranchesView<V>),
    Tree(BranchTreeView<V>),
    File(V),
    Issues(IssueCollectionView<IssueContentsView>),
    Issue(IssueContentsView),
    IssueComments(IssueCommentsView),
    Discussions(DiscussionCollectionView),
    Discussion(Discussion),
    Objects(RepoObjectsView),
    Json(Value),
    Text(String),
}

impl<V> From<RepoCollectionValue> for Resolved<V> {
    fn from(value: RepoCollectionValue) -> Self {
        match value {
            RepoCollectionValue::Issues(view) => Resolved::Issues(view),
            RepoCollectionValue::Discussions(view) => Resolved::Discussions(view),
            RepoCollectionValue::Objects(view) => Resolved::Objects(view),
        }
    }
}

impl<V> From<TreeValue<V>> for Resolved<V> {
    fn from(value: TreeValue<V>) -> Self {
        match value {
            TreeValue::Dir(view) => Resolved::Tree(view),
            TreeValue::File(contents) => Resolved::File(contents),
        }
    }
}

fn not_found(segment: &str, kind: &str) -> HubError {
    HubError::not_found(format!("no '{}' under {}", segment, kind))
}

fn json_child(value: &Value, segment: &str) -> Option<Value> {
    match value {
        Value::Object(map) => map.get(segment).cloned(),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|i| items.get(i))
            .cloned(),
        _ => None,
    }
}

fn json_keys(value: &Value) -> Vec<String> {
    match value {
        Value::Object(map) => map.keys().cloned().collect(),
        Value::Array(items) => (0..items.len()).map(|i| i.to_string()).collect(),
        _ => Vec::new(),
    }
}

impl<V: 'static> Resolved<V> {
    /// Short name of the variant, for messages
    pub fn kind(&self) -> &'static str {
        match self {
            Resolved::Account(_) => "account",
            Resolved::Repository(_) => "repository",
            Resolved::Branches(_) => "branches",
            Resolved::Tree(_) => "tree",
            Resolved::File(_) => "file",
            Resolved::Issues(_) => "issues",
            Resolved::Issue(_) => "issue",
            Resolved::IssueComments(_) => "issue comments",
            Resolved::Discussions(_) => "discussions",
            Resolved::Discussion(_) => "discussion",
            Resolved::Objects(_) => "collection",
            Resolved::Json(_) => "json",
            Resolved::Text(_) => "text",
        }
    }

    /// Resolves one more path segment below this value
    ///
    /// Leaf values (files, text, JSON scalars) have no children: every
    /// segment below them is not found.
    pub fn child(&self, segment: &str) -> Result<Resolved<V>> {
        let segment = segment.trim_matches('/');
        let resolved = match self {
            Resolved::Account(view) => Resolved::Branches(view.get(&segment.to_string())?),
            Resolved::Repository(view) => {
                let collection: RepoCollection = segment
                    .parse()
                    .map_err(|_| not_found(segment, "repository collections"))?;
                view.get(&collection)?.into()
            }
            Resolved::Branches(view) => Resolved::Tree(view.get(&segment.to_string())?),
            Resolved::Tree(view) => view.get(&segment.to_string())?.into(),
            Resolved::Issues(view) => {
                let number: u64 = segment.parse().map_err(|_| not_found(segment, "issues"))?;
                Resolved::Issue(view.get(&number)?)
            }
            Resolved::Issue(view) => match view.get(&segment.to_string())? {
                IssueContent::Body(body) => Resolved::Text(body),
                IssueContent::Comments(comments) => Resolved::IssueComments(comments),
            },
            Resolved::IssueComments(view) => {
                let index: usize = segment
                    .parse()
                    .map_err(|_| not_found(segment, "issue comments"))?;
                Resolved::Text(view.get(&index)?)
            }
            Resolved::Discussions(view) => {
                let number: u64 = segment
                    .parse()
                    .map_err(|_| not_found(segment, "discussions"))?;
                Resolved::Discussion(view.get(&number)?)
            }
            Resolved::Discussion(discussion) => {
                let value = serde_json::to_value(discussion)?;
                json_child(&value, segment)
                    .map(Resolved::Json)
                    .ok_or_else(|| not_found(segment, "discussion"))?
            }
            Resolved::Objects(view) => Resolved::Json(view.get(&view.parse_key(segment)?)?),
            Resolved::Json(value) => json_child(value, segment)
                .map(Resolved::Json)
                .ok_or_else(|| not_found(segment, "json value"))?,
            Resolved::File(_) | Resolved::Text(_) => return Err(not_found(segment, self.kind())),
        };
        Ok(resolved)
    }

    /// Keys below this value, as path segments
    pub fn keys(&self) -> Result<Vec<String>> {
        fn strings<K: ToString>(keys: Vec<K>) -> Vec<String> {
            keys.iter().map(ToString::to_string).collect()
        }

        Ok(match self {
            Resolved::Account(view) => view.keys()?,
            Resolved::Repository(view) => strings(view.keys()?),
            Resolved::Branches(view) => view.keys()?,
            Resolved::Tree(view) => view.keys()?,
            Resolved::Issues(view) => strings(view.keys()?),
            Resolved::Issue(view) => view.keys()?,
            Resolved::IssueComments(view) => strings(view.keys()?),
            Resolved::Discussions(view) => strings(view.keys()?),
            Resolved::Discussion(discussion) => json_keys(&serde_json::to_value(discussion)?),
            Resolved::Objects(view) => strings(view.keys()?),
            Resolved::Json(value) => json_keys(value),
            Resolved::File(_) | Resolved::Text(_) => Vec::new(),
        })
    }
}

impl<V> fmt::Debug for Resolved<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::Account(view) => f.debug_tuple("Account").field(view).finish(),
            Resolved::Repository(view) => f.debug_tuple("Repository").field(view).finish(),
            Resolved::Branches(view) => f.debug_tuple("Branches").field(view).finish(),
            Resolved::Tree(view) => f.debug_tuple("Tree").field(view).finish(),
            Resolved::File(_) => f.write_str("File(..)"),
            Resolved::Issues(view) => f.debug_tuple("Issues").field(view).finish(),
            Resolved::Issue(view) => f.debug_tuple("Issue").field(view).finish(),
            Resolved::IssueComments(view) => f.debug_tuple("IssueComments").field(view).finish(),
            Resolved::Discussions(view) => f.debug_tuple("Discussions").field(view).finish(),
            Resolved::Discussion(d) => f.debug_tuple("Discussion").field(&d.number).finish(),
            Resolved::Objects(view) => f.debug_tuple("Objects").field(view).finish(),
            Resolved::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Resolved::Text(text) => f.debug_tuple("Text").field(text).finish(),
        }
    }
}

/// Maps path strings onto views
///
/// # Examples
///
/// ```no_run
/// use hubcap::github::GithubClient;
/// use hubcap::router::{PathRouter, Resolved};
///
/// let router = PathRouter::new(GithubClient::from_env().unwrap());
/// match router.route("acme/widget/tree/main/README.md").unwrap() {
///     Resolved::File(bytes) => println!("{}", String::from_utf8_lossy(&bytes)),
///     other => println!("{} entries", other.keys().unwrap().len()),
/// }
/// ```
pub struct PathRouter<V = Vec<u8>> {
    client: GithubClient,
    extractor: ContentExtractor<V>,
}

impl PathRouter<Vec<u8>> {
    /// A router whose file values are decoded bytes
    pub fn new(client: GithubClient) -> Self {
        Self::with_extractor(client, Rc::new(decoded_contents))
    }
}

impl<V: 'static> PathRouter<V> {
    pub fn with_extractor(client: GithubClient, extractor: ContentExtractor<V>) -> Self {
        Self { client, extractor }
    }

    pub fn client(&self) -> &GithubClient {
        &self.client
    }

    /// Resolves a path or GitHub URL
    ///
    /// # Parameters
    ///
    /// * `path` - `owner[/repo[/...]]` or any URL form accepted by
    ///   [`parse_location`]
    ///
    /// # Returns
    ///
    /// The resolved value, [`HubError::NotFound`] when any segment does not
    /// exist, or [`HubError::Configuration`] for an unparseable path.
    pub fn route(&self, path: &str) -> Result<Resolved<V>> {
        let HubPath { owner, repo, rest } = parse_location(path)?;
        tracing::debug!("Routing {:?}", path);

        let Some(repo) = repo else {
            return Ok(Resolved::Account(AccountView::with_extractor(
                self.client.clone(),
                owner,
                self.extractor.clone(),
            )?));
        };

        let handle = RepositoryHandle::resolve(&self.client, &RepoSpec::new(owner, repo))?;
        let mut segments = rest.into_iter();

        let Some(first) = segments.next() else {
            return Ok(Resolved::Repository(RepositoryView::from_handle(handle)));
        };

        let mut current: Resolved<V> = if let Ok(collection) = first.parse::<RepoCollection>() {
            tracing::info!("{}: {} collection", handle.full_name(), collection);
            RepositoryView::from_handle(handle).get(&collection)?.into()
        } else {
            let branches = RepositoryBranchesView::with_extractor(handle, self.extractor.clone());
            let branch = if is_route_marker(&first) {
                match segments.next() {
                    Some(branch) => branch,
                    None => {
                        tracing::info!("{}: branch listing", branches.repository().full_name());
                        return Ok(Resolved::Branches(branches));
                    }
                }
            } else {
                first
            };
            tracing::info!("{}: tree of branch {}", branches.repository().full_name(), branch);
            Resolved::Tree(branches.get(&branch)?)
        };

        for segment in segments {
            current = current.child(&segment)?;
        }
        tracing::debug!("{:?} resolved to {}", path, current.kind());
        Ok(current)
    }
}

impl<V> fmt::Debug for PathRouter<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathRouter")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_route_markers() {
        assert!(is_route_marker("tree"));
        assert!(is_route_marker("blob"));
        assert!(!is_route_marker("issues"));
    }

    #[test]
    fn test_json_navigation() {
        let value: Resolved = Resolved::Json(json!({"labels": [{"name": "bug"}]}));
        assert_eq!(value.keys().unwrap(), vec!["labels"]);

        let labels = value.child("labels").unwrap();
        assert_eq!(labels.keys().unwrap(), vec!["0"]);

        match labels.child("0").unwrap().child("name").unwrap() {
            Resolved::Json(name) => assert_eq!(name, json!("bug")),
            other => panic!("unexpected {:?}", other),
        }
        assert!(labels.child("1").unwrap_err().is_not_found());
        assert!(labels.child("x").unwrap_err().is_not_found());
    }

    #[test]
    fn test_leaves_have_no_children() {
        let text: Resolved = Resolved::Text("body".to_string());
        assert!(text.keys().unwrap().is_empty());
        assert!(text.child("anything").unwrap_err().is_not_found());

        let file: Resolved = Resolved::File(b"bytes".to_vec());
        assert!(file.child("x").unwrap_err().is_not_found());
    }

    #[test]
    fn test_discussion_navigates_as_json() {
        let discussion = Discussion {
            number: 7,
            title: "Roadmap".to_string(),
            body: "".to_string(),
            url: None,
            author: Some("octocat".to_string()),
            created_at: None,
            updated_at: None,
            comments: Vec::new(),
        };
        let resolved: Resolved = Resolved::Discussion(discussion);
        assert!(resolved.keys().unwrap().contains(&"title".to_string()));
        match resolved.child("title").unwrap() {
            Resolved::Json(title) => assert_eq!(title, json!("Roadmap")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
