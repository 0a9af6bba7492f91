//! Client configuration and credential resolution
//!
//! The token is optional for public REST reads but required for GraphQL
//! (discussions) and for views of the authenticated user.
//!
//! ```bash
//! # Checked first
//! export HUBCAP_GITHUB_TOKEN=your_github_token
//! # Fallback
//! export GITHUB_TOKEN=your_github_token
//! ```

use std::time::Duration;

/// Environment variables consulted for a token, in order
pub const TOKEN_ENV_VARS: [&str; 2] = ["HUBCAP_GITHUB_TOKEN", "GITHUB_TOKEN"];

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_PER_PAGE: u8 = 100;

/// Settings for [`GithubClient`](super::GithubClient)
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use hubcap::github::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_token("ghp_example")
///     .with_timeout(Duration::from_secs(5))
///     .with_per_page(250);
///
/// assert_eq!(config.per_page, 100);
/// assert_eq!(config.graphql_endpoint(), "https://api.github.com/graphql");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST API root, e.g. `https://api.github.com` or `https://host/api/v3`
    pub base_url: String,

    /// GraphQL endpoint; derived from `base_url` when `None`
    pub graphql_url: Option<String>,

    /// Bearer token sent with every request when present
    pub token: Option<String>,

    /// Request timeout applied by the underlying HTTP client
    pub timeout: Duration,

    /// Page size for REST listings (1-100)
    pub per_page: u8,

    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            graphql_url: None,
            token: None,
            timeout: DEFAULT_TIMEOUT,
            per_page: DEFAULT_PER_PAGE,
            user_agent: format!(
                "hubcap/{} (https://github.com/tacogips/hubcap)",
                env!("CARGO_PKG_VERSION")
            ),
        }
    }
}

impl ClientConfig {
    /// Default configuration with the token taken from the environment
    pub fn from_env() -> Self {
        Self {
            token: resolve_token(None),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_graphql_url(mut self, graphql_url: impl Into<String>) -> Self {
        self.graphql_url = Some(graphql_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the listing page size, clamped to GitHub's 1..=100 range
    pub fn with_per_page(mut self, per_page: u16) -> Self {
        self.per_page = per_page.clamp(1, 100) as u8;
        self
    }

    /// The GraphQL endpoint, `{base_url}/graphql` unless set explicitly
    pub fn graphql_endpoint(&self) -> String {
        match &self.graphql_url {
            Some(url) => url.clone(),
            None => format!("{}/graphql", self.base_url.trim_end_matches('/')),
        }
    }
}

/// Resolves a token from an explicit value or the environment
///
/// Empty strings are treated as absent.
pub fn resolve_token(explicit: Option<String>) -> Option<String> {
    explicit
        .filter(|t| !t.trim().is_empty())
        .or_else(|| {
            TOKEN_ENV_VARS
                .iter()
                .filter_map(|name| std::env::var(name).ok())
                .find(|t| !t.trim().is_empty())
        })
}
