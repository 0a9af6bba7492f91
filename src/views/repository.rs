//! Repository handle and the collection-name index of a repository

use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use super::discussions::DiscussionCollectionView;
use super::issues::{IssueCollectionView, IssueContentsView};
use super::objects::RepoObjectsView;
use super::LazyKeyedView;
use crate::github::client::encode_path;
use crate::github::{GithubClient, HubError, RepoSpec, RepositoryInfo, Result};

/// Fields [`RepositoryHandle::summary`] reports when none are named
pub const DEFAULT_SUMMARY_FIELDS: [&str; 8] = [
    "name",
    "full_name",
    "description",
    "stargazers_count",
    "forks_count",
    "watchers_count",
    "html_url",
    "last_commit_date",
];

/// Derived from the newest commit rather than the repository payload
const LAST_COMMIT_DATE: &str = "last_commit_date";

/// A repository confirmed to exist, shared by every view below it
#[derive(Clone)]
pub struct RepositoryHandle {
    client: GithubClient,
    info: Rc<RepositoryInfo>,
}

impl RepositoryHandle {
    /// Looks the repository up with `GET /repos/{owner}/{repo}`
    ///
    /// # Returns
    ///
    /// The handle, or [`HubError::NotFound`] when the repository does not
    /// exist or is not visible to the configured token.
    pub fn resolve(client: &GithubClient, spec: &RepoSpec) -> Result<Self> {
        let route = format!(
            "repos/{}/{}",
            encode_path(&spec.owner),
            encode_path(&spec.repo)
        );
        let info: RepositoryInfo = client.get_json(&route, &[]).map_err(|e| {
            if e.is_not_found() {
                HubError::not_found(format!("repository {}", spec))
            } else {
                e
            }
        })?;
        tracing::debug!("Resolved repository {}", info.full_name);
        Ok(Self::from_info(client.clone(), info))
    }

    /// Wraps an already fetched repository payload
    pub fn from_info(client: GithubClient, info: RepositoryInfo) -> Self {
        Self {
            client,
            info: Rc::new(info),
        }
    }

    pub fn client(&self) -> &GithubClient {
        &self.client
    }

    pub fn info(&self) -> &RepositoryInfo {
        &self.info
    }

    pub fn full_name(&self) -> &str {
        &self.info.full_name
    }

    pub fn owner(&self) -> &str {
        self.info.owner_login()
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn spec(&self) -> RepoSpec {
        RepoSpec::new(self.owner(), self.name())
    }

    /// Selected repository fields as a JSON object
    ///
    /// `last_commit_date` is the committer date of the newest commit on the
    /// default branch (`null` for an empty repository). Any other name must be
    /// a field of [`RepositoryInfo`]; unknown names are a configuration error.
    pub fn summary(&self, fields: &[&str]) -> Result<Map<String, Value>> {
        let info = serde_json::to_value(self.info.as_ref())?;
        let mut summary = Map::new();
        for &field in fields {
            let value = if field == LAST_COMMIT_DATE {
                self.last_commit_date()?.map_or(Value::Null, Value::String)
            } else {
                info.get(field).cloned().ok_or_else(|| {
                    HubError::configuration(format!("unknown repository field {:?}", field))
                })?
            };
            summary.insert(field.to_string(), value);
        }
        Ok(summary)
    }

    fn last_commit_date(&self) -> Result<Option<String>> {
        let mut query = vec![("per_page", "1".to_string())];
        if let Some(branch) = &self.info.default_branch {
            query.push(("sha", branch.clone()));
        }
        let commits: Vec<Value> = match self.client.get_json(&self.route("commits"), &query) {
            Ok(commits) => commits,
            // an empty repository has no commits to list
            Err(HubError::Transport { status: Some(409), .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(commits
            .first()
            .and_then(|commit| commit.pointer("/commit/committer/date"))
            .and_then(Value::as_str)
            .map(String::from))
    }

    /// REST route under this repository, e.g. `route("issues")` →
    /// `repos/acme/widget/issues`
    pub fn route(&self, suffix: &str) -> String {
        let base = format!(
            "repos/{}/{}",
            encode_path(self.owner()),
            encode_path(self.name())
        );
        if suffix.is_empty() {
            base
        } else {
            format!("{}/{}", base, suffix.trim_start_matches('/'))
        }
    }
}

impl fmt::Debug for RepositoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RepositoryHandle")
            .field(&self.info.full_name)
            .finish()
    }
}

/// Named collections exposed under a repository
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum RepoCollection {
    Commits,
    Contributors,
    Deployments,
    Discussions,
    Events,
    Forks,
    Issues,
    Labels,
    Milestones,
    Pulls,
    Releases,
    Stargazers,
    Tags,
    WorkflowRuns,
    Workflows,
}

impl RepoCollection {
    /// Every collection name, sorted
    pub fn names() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Self::iter().map(<&'static str>::from).collect();
        names.sort_unstable();
        names
    }
}

/// What a repository collection name resolves to
#[derive(Debug)]
pub enum RepoCollectionValue {
    Issues(IssueCollectionView<IssueContentsView>),
    Discussions(DiscussionCollectionView),
    Objects(RepoObjectsView),
}

/// A repository as an index of its collection names
///
/// `keys()` is local: it lists the sorted [`RepoCollection`] names without
/// touching the network. `get` builds the collection view, which stays lazy.
#[derive(Debug, Clone)]
pub struct RepositoryView {
    repo: RepositoryHandle,
}

impl RepositoryView {
    /// Resolves the repository; fails with not-found if it does not exist
    pub fn new(client: &GithubClient, spec: &RepoSpec) -> Result<Self> {
        Ok(Self::from_handle(RepositoryHandle::resolve(client, spec)?))
    }

    pub fn from_handle(repo: RepositoryHandle) -> Self {
        Self { repo }
    }

    pub fn handle(&self) -> &RepositoryHandle {
        &self.repo
    }
}

impl LazyKeyedView for RepositoryView {
    type Key = RepoCollection;
    type Value = RepoCollectionValue;

    fn keys(&self) -> Result<Vec<RepoCollection>> {
        let mut keys: Vec<RepoCollection> = RepoCollection::iter().collect();
        keys.sort_by_key(|c| <&'static str>::from(*c));
        Ok(keys)
    }

    fn get(&self, key: &RepoCollection) -> Result<RepoCollectionValue> {
        let value = match key {
            RepoCollection::Issues => RepoCollectionValue::Issues(IssueCollectionView::contents(
                self.repo.clone(),
                Default::default(),
            )),
            RepoCollection::Discussions => RepoCollectionValue::Discussions(
                DiscussionCollectionView::new(self.repo.clone())?,
            ),
            other => RepoCollectionValue::Objects(RepoObjectsView::new(self.repo.clone(), *other)?),
        };
        Ok(value)
    }

    fn contains(&self, _key: &RepoCollection) -> Result<bool> {
        Ok(true)
    }
}
