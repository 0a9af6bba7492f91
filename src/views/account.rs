//! Repositories owned by one account

use std::fmt;

use super::branches::RepositoryBranchesView;
use super::collection::{EnumeratedCollectionView, keyed_by};
use super::repository::RepositoryHandle;
use super::tree::{ContentExtractor, default_extractor};
use super::LazyKeyedView;
use crate::github::client::encode_path;
use crate::github::{Account, GithubClient, HubError, RepositoryInfo, Result};

/// Where an account's repositories are listed from
#[derive(Debug, Clone)]
struct AccountRef {
    client: GithubClient,
    login: String,
    /// Listing through `/user/repos` includes private repositories
    authenticated: bool,
}

impl AccountRef {
    fn list(&self) -> Result<Vec<RepositoryInfo>> {
        let repos: Vec<RepositoryInfo> = if self.authenticated {
            self.client.get_paginated(
                "user/repos",
                &[("affiliation", "owner".to_string())],
                None,
            )?
        } else {
            self.client.get_paginated(
                &format!("users/{}/repos", encode_path(&self.login)),
                &[("type", "owner".to_string())],
                None,
            )?
        };
        Ok(repos
            .into_iter()
            .filter(|repo| {
                let owned = self.owns(repo);
                if !owned {
                    tracing::warn!(
                        "Skipping {}/{} listed under {}",
                        repo.owner_login(),
                        repo.name,
                        self.login
                    );
                }
                owned
            })
            .collect())
    }

    fn fetch(&self, name: &str) -> Result<RepositoryInfo> {
        let route = format!("repos/{}/{}", encode_path(&self.login), encode_path(name));
        let repo: RepositoryInfo = self.client.get_json(&route, &[]).map_err(|e| {
            if e.is_not_found() {
                HubError::not_found(format!("repository {}/{}", self.login, name))
            } else {
                e
            }
        })?;
        // transferred repositories redirect to their new owner
        if !self.owns(&repo) {
            return Err(HubError::not_found(format!("repository {}/{}", self.login, name)));
        }
        Ok(repo)
    }

    fn owns(&self, repo: &RepositoryInfo) -> bool {
        repo.owner_login().eq_ignore_ascii_case(&self.login)
    }
}

/// Repository names of one account, each resolving to the repository's
/// [`RepositoryBranchesView`]
///
/// Listing enumerates the account's repositories once; resolving a name before
/// that checks the single repository with `GET /repos/{login}/{name}`.
///
/// # Examples
///
/// ```no_run
/// use hubcap::github::GithubClient;
/// use hubcap::views::{AccountView, LazyKeyedView};
///
/// let account = AccountView::new(GithubClient::from_env().unwrap(), "acme").unwrap();
/// for name in account.keys().unwrap() {
///     println!("{}", name);
/// }
/// ```
pub struct AccountView<V = Vec<u8>> {
    view: EnumeratedCollectionView<AccountRef, String, RepositoryInfo, RepositoryBranchesView<V>>,
}

impl AccountView<Vec<u8>> {
    /// Repositories of `login`, with files resolving to decoded bytes
    pub fn new(client: GithubClient, login: impl Into<String>) -> Result<Self> {
        Self::with_extractor(client, login, default_extractor())
    }

    /// Repositories owned by the token's user, private ones included
    pub fn authenticated(client: GithubClient) -> Result<Self> {
        client.require_token("listing the authenticated user's repositories")?;
        let user: Account = client.get_json("user", &[])?;
        tracing::debug!("Authenticated as {}", user.login);
        Ok(Self::build(
            AccountRef {
                client,
                login: user.login,
                authenticated: true,
            },
            default_extractor(),
        ))
    }
}

impl<V: 'static> AccountView<V> {
    /// Repositories of `login`, with files resolving through `extractor`
    ///
    /// Fails with a configuration error for an empty login.
    pub fn with_extractor(
        client: GithubClient,
        login: impl Into<String>,
        extractor: ContentExtractor<V>,
    ) -> Result<Self> {
        let login: String = login.into();
        let login = login.trim().to_string();
        if login.is_empty() || login.contains('/') {
            return Err(HubError::configuration(format!(
                "invalid account login {:?}",
                login
            )));
        }
        Ok(Self::build(
            AccountRef {
                client,
                login,
                authenticated: false,
            },
            extractor,
        ))
    }

    fn build(account: AccountRef, extractor: ContentExtractor<V>) -> Self {
        let label = format!("{} repositories", account.login);
        let client = account.client.clone();
        let view = EnumeratedCollectionView::new(
            label,
            account,
            AccountRef::list,
            keyed_by(|repo: &RepositoryInfo| Ok(repo.name.clone())),
            move |repo: &RepositoryInfo| {
                Ok(RepositoryBranchesView::with_extractor(
                    RepositoryHandle::from_info(client.clone(), repo.clone()),
                    extractor.clone(),
                ))
            },
        )
        .with_fetcher(|account: &AccountRef, name: &String| account.fetch(name));
        Self { view }
    }

    pub fn login(&self) -> &str {
        &self.view.parent().login
    }
}

impl<V: 'static> LazyKeyedView for AccountView<V> {
    type Key = String;
    type Value = RepositoryBranchesView<V>;

    fn keys(&self) -> Result<Vec<String>> {
        self.view.keys()
    }

    fn get(&self, name: &String) -> Result<RepositoryBranchesView<V>> {
        self.view.get(name)
    }
}

impl<V> fmt::Debug for AccountView<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccountView").field(&self.view).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::ClientConfig;

    #[test]
    fn test_invalid_login_is_rejected() {
        let client = GithubClient::new(ClientConfig::default()).unwrap();
        assert!(AccountView::new(client.clone(), "  ").unwrap_err().is_configuration());
        assert!(AccountView::new(client, "acme/widget").unwrap_err().is_configuration());
    }

    #[test]
    fn test_authenticated_requires_token() {
        let client = GithubClient::new(ClientConfig::default()).unwrap();
        assert!(AccountView::authenticated(client).unwrap_err().is_configuration());
    }
}
