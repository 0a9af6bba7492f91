//! GitHub access layer
//!
//! This module provides:
//! - A blocking REST/GraphQL client ([`GithubClient`])
//! - Client configuration and token resolution ([`ClientConfig`])
//! - The error taxonomy shared by every view ([`HubError`])
//! - Models for the resources the views expose
//! - Location parsing (`owner/repo/...` and GitHub URL forms)
//!
//! ## Authentication
//!
//! ```no_run
//! use hubcap::github::{ClientConfig, GithubClient};
//!
//! // Token from HUBCAP_GITHUB_TOKEN or GITHUB_TOKEN
//! let client = GithubClient::from_env().unwrap();
//!
//! // Or explicitly
//! let client = GithubClient::new(ClientConfig::default().with_token("your_github_token")).unwrap();
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod location;
pub mod models;
pub mod pagination;

pub use client::GithubClient;
pub use config::{ClientConfig, resolve_token};
pub use error::{HubError, Result};
pub use location::{HubPath, RepoSpec, parse_location};
pub use models::{
    Account, Branch, ContentFile, ContentKind, Discussion, DiscussionComment, DiscussionReply,
    Issue, IssueComment, IssueState, RepositoryInfo,
};
