//! Domain models for GitHub resources
//!
//! These mirror the subset of the REST and GraphQL payloads the views rely on.
//! Everything that is not needed to key or navigate a resource is optional, so
//! a partial payload still deserializes.

use base64::Engine;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::error::{HubError, Result};

/// A user or organization as embedded in other payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Login name (user or organization)
    pub login: String,

    #[serde(default)]
    pub id: Option<u64>,

    /// Owner type (User or Organization)
    #[serde(rename = "type", default)]
    pub type_field: Option<String>,

    #[serde(default)]
    pub html_url: Option<String>,
}

/// Repository license information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryLicense {
    /// License key/identifier
    pub key: String,

    /// License name
    pub name: String,
}

/// A resolved repository
///
/// Obtained either from `GET /repos/{owner}/{repo}` or from an account's
/// repository listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryInfo {
    #[serde(default)]
    pub id: Option<u64>,

    /// Repository name (without owner)
    pub name: String,

    /// `owner/name`
    pub full_name: String,

    pub owner: Account,

    #[serde(default)]
    pub private: Option<bool>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub html_url: Option<String>,

    #[serde(default)]
    pub fork: Option<bool>,

    #[serde(default)]
    pub archived: Option<bool>,

    /// Default branch name
    #[serde(default)]
    pub default_branch: Option<String>,

    #[serde(default)]
    pub stargazers_count: Option<u64>,

    #[serde(default)]
    pub forks_count: Option<u64>,

    #[serde(default)]
    pub watchers_count: Option<u64>,

    #[serde(default)]
    pub open_issues_count: Option<u64>,

    #[serde(default)]
    pub language: Option<String>,

    #[serde(default)]
    pub license: Option<RepositoryLicense>,

    #[serde(default)]
    pub topics: Option<Vec<String>>,

    #[serde(default)]
    pub pushed_at: Option<String>,

    #[serde(default)]
    pub updated_at: Option<String>,
}

impl RepositoryInfo {
    /// The owner segment of `full_name`
    pub fn owner_login(&self) -> &str {
        self.full_name
            .split_once('/')
            .map(|(owner, _)| owner)
            .unwrap_or(&self.owner.login)
    }
}

/// Commit pointer embedded in a branch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRef {
    pub sha: String,
}

/// A branch as returned by `/repos/{owner}/{repo}/branches`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,

    pub commit: CommitRef,

    #[serde(default)]
    pub protected: Option<bool>,
}

/// Kind of an entry returned by the contents API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ContentKind {
    File,
    Dir,
    Symlink,
    Submodule,
}

/// One entry of the contents API
///
/// Directory listings return these without `content`; a request for a single
/// file returns one with the base64 payload filled in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentFile {
    pub name: String,

    /// Path from the repository root
    pub path: String,

    #[serde(rename = "type")]
    pub kind: ContentKind,

    #[serde(default)]
    pub sha: Option<String>,

    #[serde(default)]
    pub size: Option<u64>,

    /// Payload encoding, `base64` for regular files
    #[serde(default)]
    pub encoding: Option<String>,

    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub download_url: Option<String>,

    #[serde(default)]
    pub html_url: Option<String>,
}

impl ContentFile {
    pub fn is_dir(&self) -> bool {
        self.kind == ContentKind::Dir
    }

    /// Decodes the payload into raw bytes
    ///
    /// Pure function of the entry: repeated calls return identical bytes.
    pub fn decoded_content(&self) -> Result<Vec<u8>> {
        let content = self.content.as_deref().unwrap_or("");
        match self.encoding.as_deref() {
            Some("base64") => {
                // GitHub wraps the payload at 60 columns
                let compact: String = content.split_whitespace().collect();
                base64::engine::general_purpose::STANDARD
                    .decode(compact.as_bytes())
                    .map_err(|e| {
                        HubError::protocol(format!("invalid base64 payload for {}: {}", self.path, e))
                    })
            }
            None | Some("") | Some("utf-8") => Ok(content.as_bytes().to_vec()),
            Some(other) => Err(HubError::protocol(format!(
                "unsupported content encoding '{}' for {}",
                other, self.path
            ))),
        }
    }
}

/// Issue label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueLabel {
    pub name: String,

    #[serde(default)]
    pub color: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

/// Issue state filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum IssueState {
    #[default]
    Open,
    Closed,
    All,
}

/// An issue snapshot as returned by `/repos/{owner}/{repo}/issues`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub id: Option<u64>,

    /// Issue number within the repository
    pub number: u64,

    pub title: String,

    #[serde(default)]
    pub body: Option<String>,

    /// `open` or `closed`
    pub state: String,

    #[serde(default)]
    pub user: Option<Account>,

    #[serde(default)]
    pub labels: Vec<IssueLabel>,

    /// Number of comments
    #[serde(default)]
    pub comments: u64,

    #[serde(default)]
    pub html_url: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub updated_at: Option<String>,

    #[serde(default)]
    pub closed_at: Option<String>,

    /// Present when the "issue" is actually a pull request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

/// A comment on an issue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueComment {
    #[serde(default)]
    pub id: Option<u64>,

    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub user: Option<Account>,

    #[serde(default)]
    pub created_at: Option<String>,
}

/// Author block of GraphQL payloads; `null` for deleted accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub login: String,
}

/// A discussion with every comment and reply accumulated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discussion {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub url: Option<String>,
    pub author: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub comments: Vec<DiscussionComment>,
}

/// A top-level discussion comment with its replies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscussionComment {
    pub id: String,
    pub body: String,
    pub author: Option<String>,
    pub created_at: Option<String>,
    pub replies: Vec<DiscussionReply>,
}

/// A reply to a discussion comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionReply {
    pub body: String,
    pub author: Option<String>,
    pub created_at: Option<String>,
}
