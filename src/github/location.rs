//! Parsing and generation of GitHub locations
//!
//! Accepted forms all reduce to `owner[/repo[/rest...]]`:
//! - `owner/repo/...`
//! - `https://github.com/owner/repo/...` (also `http://`, `www.`, bare `github.com/`)
//! - `git@github.com:owner/repo.git`
//! - `github:owner/repo`
//!
//! The same prefix table drives both directions, so a parsed location can be
//! turned back into a browser or clone URL.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{HubError, Result};

/// Location prefixes stripped before splitting, longest first
const LOCATION_PREFIXES: [&str; 8] = [
    "https://www.github.com/",
    "http://www.github.com/",
    "https://github.com/",
    "http://github.com/",
    "www.github.com/",
    "github.com/",
    "git@github.com:",
    "github:",
];

const HTTPS_PREFIX: &str = "https://github.com/";
const SSH_PREFIX: &str = "git@github.com:";

/// An `owner/repo` pair
///
/// # Examples
///
/// ```
/// use hubcap::github::RepoSpec;
///
/// let spec: RepoSpec = "https://github.com/BurntSushi/ripgrep".parse().unwrap();
/// assert_eq!(spec.full_name(), "BurntSushi/ripgrep");
/// assert_eq!(spec.to_ssh_url(), "git@github.com:BurntSushi/ripgrep.git");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoSpec {
    /// GitHub username or organization
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl RepoSpec {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parses `owner/repo` or any URL form naming exactly one repository
    pub fn parse(location: &str) -> Result<Self> {
        let path = parse_location(location)?;
        match (path.repo, path.rest.is_empty()) {
            (Some(repo), true) => Ok(RepoSpec::new(path.owner, repo)),
            _ => Err(HubError::configuration(format!(
                "not a repository identifier (expected owner/repo): {}",
                location
            ))),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    pub fn to_https_url(&self) -> String {
        format!("{}{}/{}", HTTPS_PREFIX, self.owner, self.repo)
    }

    /// Clone URL in SSH form (`git@github.com:owner/repo.git`)
    pub fn to_ssh_url(&self) -> String {
        format!("{}{}/{}.git", SSH_PREFIX, self.owner, self.repo)
    }
}

impl FromStr for RepoSpec {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self> {
        RepoSpec::parse(s)
    }
}

impl fmt::Display for RepoSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// A parsed location: an owner, optionally a repository, and the remaining
/// path segments in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubPath {
    pub owner: String,
    pub repo: Option<String>,
    pub rest: Vec<String>,
}

impl HubPath {
    pub fn repo_spec(&self) -> Option<RepoSpec> {
        self.repo
            .as_ref()
            .map(|repo| RepoSpec::new(self.owner.clone(), repo.clone()))
    }

    /// Browser URL for this location
    pub fn to_https_url(&self) -> String {
        let mut url = format!("{}{}", HTTPS_PREFIX, self.owner);
        if let Some(repo) = &self.repo {
            url.push('/');
            url.push_str(repo);
        }
        for segment in &self.rest {
            url.push('/');
            url.push_str(segment);
        }
        url
    }
}

/// Reduces any accepted location form to its components
///
/// Empty segments (doubled or trailing slashes) are dropped, and a `.git`
/// suffix on the repository segment is removed.
///
/// ```
/// use hubcap::github::parse_location;
///
/// let path = parse_location("https://github.com/acme/widget/tree/main/src/").unwrap();
/// assert_eq!(path.owner, "acme");
/// assert_eq!(path.repo.as_deref(), Some("widget"));
/// assert_eq!(path.rest, vec!["tree", "main", "src"]);
/// ```
pub fn parse_location(location: &str) -> Result<HubPath> {
    let trimmed = location.trim();
    let stripped = LOCATION_PREFIXES
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed);

    let mut segments = stripped.split('/').filter(|s| !s.is_empty());

    let owner = match segments.next() {
        Some(owner) if !owner.contains(':') => owner.to_string(),
        _ => {
            return Err(HubError::configuration(format!(
                "cannot parse GitHub location: {:?}",
                location
            )));
        }
    };
    let repo = match segments.next() {
        Some(repo) => {
            let repo = repo.strip_suffix(".git").unwrap_or(repo);
            if repo.is_empty() {
                return Err(HubError::configuration(format!(
                    "empty repository name in {:?}",
                    location
                )));
            }
            Some(repo.to_string())
        }
        None => None,
    };
    let rest = segments.map(String::from).collect();

    let path = HubPath { owner, repo, rest };
    tracing::debug!("Parsed location {:?} -> {:?}", location, path);
    Ok(path)
}
