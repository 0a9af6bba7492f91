//! Branches of a repository

use std::fmt;

use super::collection::{EnumeratedCollectionView, keyed_by};
use super::repository::RepositoryHandle;
use super::tree::{BranchTreeView, ContentExtractor, default_extractor};
use super::LazyKeyedView;
use crate::github::client::encode_path;
use crate::github::{Branch, HubError, Result};

/// Branch names of one repository, each resolving to the root [`BranchTreeView`]
///
/// Before the branch list has been fetched, `get` checks a single branch with
/// `GET /repos/{owner}/{repo}/branches/{name}` instead of enumerating all of
/// them.
pub struct RepositoryBranchesView<V = Vec<u8>> {
    view: EnumeratedCollectionView<RepositoryHandle, String, Branch, BranchTreeView<V>>,
}

impl RepositoryBranchesView<Vec<u8>> {
    /// Branches whose files resolve to decoded bytes
    pub fn new(repo: RepositoryHandle) -> Self {
        Self::with_extractor(repo, default_extractor())
    }
}

impl<V: 'static> RepositoryBranchesView<V> {
    /// Branches whose files resolve through `extractor`
    pub fn with_extractor(repo: RepositoryHandle, extractor: ContentExtractor<V>) -> Self {
        let label = format!("{} branches", repo.full_name());
        let tree_repo = repo.clone();
        let view = EnumeratedCollectionView::new(
            label,
            repo,
            |repo: &RepositoryHandle| {
                repo.client()
                    .get_paginated::<Branch>(&repo.route("branches"), &[], None)
            },
            keyed_by(|branch: &Branch| Ok(branch.name.clone())),
            move |branch: &Branch| {
                Ok(BranchTreeView::new(
                    tree_repo.clone(),
                    branch.name.clone(),
                    "",
                    extractor.clone(),
                ))
            },
        )
        .with_fetcher(|repo: &RepositoryHandle, name: &String| {
            let route = repo.route(&format!("branches/{}", encode_path(name)));
            repo.client().get_json::<Branch>(&route, &[]).map_err(|e| {
                if e.is_not_found() {
                    HubError::not_found(format!("branch {} of {}", name, repo.full_name()))
                } else {
                    e
                }
            })
        });
        Self { view }
    }

    pub fn repository(&self) -> &RepositoryHandle {
        self.view.parent()
    }

    /// Root tree of the repository's default branch
    pub fn default_branch(&self) -> Result<BranchTreeView<V>> {
        let name = self
            .repository()
            .info()
            .default_branch
            .clone()
            .ok_or_else(|| {
                HubError::protocol(format!(
                    "{} reports no default branch",
                    self.repository().full_name()
                ))
            })?;
        self.get(&name)
    }
}

impl<V: 'static> LazyKeyedView for RepositoryBranchesView<V> {
    type Key = String;
    type Value = BranchTreeView<V>;

    fn keys(&self) -> Result<Vec<String>> {
        self.view.keys()
    }

    fn get(&self, name: &String) -> Result<BranchTreeView<V>> {
        self.view.get(name)
    }
}

impl<V> fmt::Debug for RepositoryBranchesView<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RepositoryBranchesView")
            .field(&self.view)
            .finish()
    }
}
