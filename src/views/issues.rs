//! Issues of a repository, their bodies and comments

use std::fmt;

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use super::collection::{EnumeratedCollectionView, enumerate_items, keyed_by};
use super::repository::RepositoryHandle;
use super::LazyKeyedView;
use crate::github::{HubError, Issue, IssueComment, IssueState, Result};

/// Issues keyed by number
///
/// Pull requests, which the REST issues listing mixes in, are excluded. The
/// state filter (`open` by default) applies to both `keys` and `get`: an issue
/// outside the filter is not found.
///
/// # Examples
///
/// ```no_run
/// use hubcap::github::{GithubClient, IssueState, RepoSpec};
/// use hubcap::views::{IssueCollectionView, LazyKeyedView, RepositoryHandle};
///
/// let client = GithubClient::from_env().unwrap();
/// let repo = RepositoryHandle::resolve(&client, &RepoSpec::new("acme", "widget")).unwrap();
/// let issues = IssueCollectionView::with_state(repo, IssueState::All);
/// for number in issues.keys().unwrap() {
///     println!("#{} {}", number, issues.get(&number).unwrap().title);
/// }
/// ```
pub struct IssueCollectionView<V = Issue> {
    state: IssueState,
    view: EnumeratedCollectionView<RepositoryHandle, u64, Issue, V>,
}

fn list_issues(repo: &RepositoryHandle, state: IssueState) -> Result<Vec<Issue>> {
    let issues = repo.client().get_paginated::<Issue>(
        &repo.route("issues"),
        &[("state", state.to_string())],
        None,
    )?;
    let total = issues.len();
    let issues: Vec<Issue> = issues
        .into_iter()
        .filter(|issue| !issue.is_pull_request())
        .collect();
    tracing::debug!(
        "{}: {} {} issue(s), {} pull request(s) skipped",
        repo.full_name(),
        issues.len(),
        state,
        total - issues.len()
    );
    Ok(issues)
}

impl IssueCollectionView<Issue> {
    /// Open issues, each resolving to its snapshot
    pub fn new(repo: RepositoryHandle) -> Self {
        Self::with_state(repo, IssueState::Open)
    }

    pub fn with_state(repo: RepositoryHandle, state: IssueState) -> Self {
        Self::with_value(repo, state, |_, issue| Ok(issue.clone()))
    }
}

impl IssueCollectionView<IssueContentsView> {
    /// Issues resolving to a `body` / `comments` view instead of a snapshot
    pub fn contents(repo: RepositoryHandle, state: IssueState) -> Self {
        Self::with_value(repo, state, |repo, issue| {
            Ok(IssueContentsView::new(repo.clone(), issue.clone()))
        })
    }
}

impl<V: 'static> IssueCollectionView<V> {
    /// Issues resolving through a custom `value_of`
    pub fn with_value<F>(repo: RepositoryHandle, state: IssueState, value_of: F) -> Self
    where
        F: Fn(&RepositoryHandle, &Issue) -> Result<V> + 'static,
    {
        let label = format!("{} {} issues", repo.full_name(), state);
        let value_repo = repo.clone();
        let view = EnumeratedCollectionView::new(
            label,
            repo,
            move |repo: &RepositoryHandle| list_issues(repo, state),
            keyed_by(|issue: &Issue| Ok(issue.number)),
            move |issue: &Issue| value_of(&value_repo, issue),
        );
        Self { state, view }
    }

    pub fn state(&self) -> IssueState {
        self.state
    }

    pub fn repository(&self) -> &RepositoryHandle {
        self.view.parent()
    }
}

impl<V> LazyKeyedView for IssueCollectionView<V> {
    type Key = u64;
    type Value = V;

    fn keys(&self) -> Result<Vec<u64>> {
        self.view.keys()
    }

    fn get(&self, number: &u64) -> Result<V> {
        self.view.get(number)
    }
}

impl<V> fmt::Debug for IssueCollectionView<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssueCollectionView")
            .field("state", &self.state)
            .field("view", &self.view)
            .finish()
    }
}

/// Keys of an [`IssueContentsView`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum IssueField {
    Body,
    Comments,
}

/// What an issue field resolves to
#[derive(Debug)]
pub enum IssueContent {
    /// Issue body; empty when the issue has none
    Body(String),
    Comments(IssueCommentsView),
}

/// One issue as a two-key view: `body` and `comments`
#[derive(Debug, Clone)]
pub struct IssueContentsView {
    repo: RepositoryHandle,
    issue: Issue,
}

impl IssueContentsView {
    pub fn new(repo: RepositoryHandle, issue: Issue) -> Self {
        Self { repo, issue }
    }

    /// The snapshot taken when the issue was listed
    pub fn issue(&self) -> &Issue {
        &self.issue
    }
}

impl LazyKeyedView for IssueContentsView {
    type Key = String;
    type Value = IssueContent;

    fn keys(&self) -> Result<Vec<String>> {
        Ok(IssueField::iter().map(|field| field.to_string()).collect())
    }

    fn get(&self, key: &String) -> Result<IssueContent> {
        let field: IssueField = key.parse().map_err(|_| {
            HubError::not_found(format!(
                "issue #{} of {} has no field '{}'",
                self.issue.number,
                self.repo.full_name(),
                key
            ))
        })?;
        Ok(match field {
            IssueField::Body => IssueContent::Body(self.issue.body.clone().unwrap_or_default()),
            IssueField::Comments => {
                IssueContent::Comments(IssueCommentsView::new(self.repo.clone(), self.issue.number))
            }
        })
    }
}

/// Parent of an issue's comment listing
#[derive(Debug, Clone)]
struct IssueRef {
    repo: RepositoryHandle,
    number: u64,
}

/// Comments of one issue, keyed by position, resolving to the comment body
pub struct IssueCommentsView {
    view: EnumeratedCollectionView<IssueRef, usize, IssueComment, String>,
}

impl IssueCommentsView {
    pub fn new(repo: RepositoryHandle, number: u64) -> Self {
        let label = format!("{}#{} comments", repo.full_name(), number);
        let view = EnumeratedCollectionView::new(
            label,
            IssueRef { repo, number },
            |parent: &IssueRef| {
                parent.repo.client().get_paginated::<IssueComment>(
                    &parent.repo.route(&format!("issues/{}/comments", parent.number)),
                    &[],
                    None,
                )
            },
            enumerate_items,
            |comment: &IssueComment| Ok(comment.body.clone().unwrap_or_default()),
        );
        Self { view }
    }

    /// Full comment payloads in order
    pub fn comments(&self) -> Result<Vec<IssueComment>> {
        Ok(self.view.raw_items()?.map(|(_, c)| c).cloned().collect())
    }
}

impl LazyKeyedView for IssueCommentsView {
    type Key = usize;
    type Value = String;

    fn keys(&self) -> Result<Vec<usize>> {
        self.view.keys()
    }

    fn get(&self, index: &usize) -> Result<String> {
        self.view.get(index)
    }
}

impl fmt::Debug for IssueCommentsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IssueCommentsView").field(&self.view).finish()
    }
}
