//! Blocking GitHub REST/GraphQL client
//!
//! Every view receives a clone of one [`GithubClient`]; clones share the
//! underlying connection pool and configuration.
//!
//! # Rate Limiting
//!
//! GitHub API has rate limits that vary based on authentication:
//! - Unauthenticated: 60 requests/hour
//! - Authenticated: 5,000 requests/hour

use std::sync::Arc;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::config::ClientConfig;
use super::error::{HubError, Result};
use super::pagination::{next_link, MAX_PAGES};

/// Error body returned by the REST API on failure
#[derive(Debug, Deserialize)]
struct RestErrorBody {
    message: String,
}

/// One entry of a GraphQL `errors` array
#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Clone)]
pub struct GithubClient {
    http: Client,
    config: Arc<ClientConfig>,
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("base_url", &self.config.base_url)
            .field("authenticated", &self.config.token.is_some())
            .finish_non_exhaustive()
    }
}

impl GithubClient {
    /// Creates a client from an explicit configuration
    ///
    /// Fails with a configuration error if the base URL does not parse or the
    /// HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        url::Url::parse(&config.base_url).map_err(|e| {
            HubError::configuration(format!("invalid base URL {:?}: {}", config.base_url, e))
        })?;

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| HubError::configuration(format!("failed to build HTTP client: {}", e)))?;

        tracing::debug!(
            "GitHub client for {} (authenticated: {})",
            config.base_url,
            config.token.is_some()
        );

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    /// Creates a client against api.github.com with the token from the environment
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn has_token(&self) -> bool {
        self.config.token.is_some()
    }

    /// Fails with a configuration error unless a token is configured
    pub fn require_token(&self, purpose: &str) -> Result<()> {
        if self.has_token() {
            Ok(())
        } else {
            Err(HubError::configuration(format!(
                "a GitHub token is required for {} (set HUBCAP_GITHUB_TOKEN or GITHUB_TOKEN)",
                purpose
            )))
        }
    }

    fn url_for(&self, route: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            route.trim_start_matches('/')
        )
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header(header::ACCEPT, "application/vnd.github+json");
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends a request and maps failure statuses onto the error taxonomy
    fn send(&self, builder: RequestBuilder, what: &str) -> Result<Response> {
        let response = self.authorize(builder).send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().unwrap_or_else(|e| {
            tracing::debug!("failed to read error body for {}: {}", what, e);
            String::new()
        });
        let message = serde_json::from_str::<RestErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or(text);

        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!("{} not found: {}", what, message);
            return Err(HubError::not_found(what.to_string()));
        }

        Err(HubError::Transport {
            status: Some(status.as_u16()),
            message: format!("{}: {}", what, message),
        })
    }

    /// Fetches a single resource
    ///
    /// `route` is relative to the configured base URL, e.g. `repos/acme/widget`.
    pub fn get_json<T: DeserializeOwned>(&self, route: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url_for(route);
        tracing::debug!("GET {} {:?}", url, query);
        let response = self.send(self.http.get(&url).query(query), route)?;
        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetches every page of a listing by following `Link: rel="next"`
    ///
    /// `items_field` names the array inside wrapped listings such as
    /// `{"total_count": 3, "workflow_runs": [...]}`; plain array responses
    /// pass `None`.
    pub fn get_paginated<T: DeserializeOwned>(
        &self,
        route: &str,
        query: &[(&str, String)],
        items_field: Option<&str>,
    ) -> Result<Vec<T>> {
        let mut query: Vec<(&str, String)> = query.to_vec();
        query.push(("per_page", self.config.per_page.to_string()));

        let first_url = self.url_for(route);
        tracing::debug!("GET (paginated) {} {:?}", first_url, query);
        let mut request = self.http.get(&first_url).query(&query);
        let mut items = Vec::new();
        let mut pages = 0;

        loop {
            let response = self.send(request, route)?;
            let next = response
                .headers()
                .get(header::LINK)
                .and_then(|value| value.to_str().ok())
                .and_then(next_link);

            let page: Value = serde_json::from_str(&response.text()?)?;
            let array = match items_field {
                Some(field) => page.get(field).cloned().ok_or_else(|| {
                    HubError::protocol(format!("{}: response has no '{}' field", route, field))
                })?,
                None => page,
            };
            let mut page_items: Vec<T> = serde_json::from_value(array)?;
            items.append(&mut page_items);
            pages += 1;

            match next {
                Some(next_url) if pages < MAX_PAGES => {
                    tracing::debug!("GET (page {}) {}", pages + 1, next_url);
                    request = self.http.get(next_url);
                }
                Some(_) => {
                    return Err(HubError::protocol(format!(
                        "{}: pagination did not terminate after {} pages",
                        route, MAX_PAGES
                    )));
                }
                None => break,
            }
        }

        tracing::debug!("{}: {} item(s) over {} page(s)", route, items.len(), pages);
        Ok(items)
    }

    /// Runs a GraphQL query and returns its `data` object
    ///
    /// An `errors` array made only of `NOT_FOUND` entries becomes
    /// [`HubError::NotFound`]; any other non-empty `errors` array becomes
    /// [`HubError::RemoteProtocol`].
    pub fn graphql(&self, query: &str, variables: Value) -> Result<Value> {
        let url = self.config.graphql_endpoint();
        tracing::debug!("POST {} variables={}", url, variables);
        let payload = serde_json::json!({
            "query": query,
            "variables": variables,
        });

        let response = self.send(self.http.post(&url).json(&payload), "graphql")?;
        let body: GraphqlResponse = serde_json::from_str(&response.text()?)?;

        if !body.errors.is_empty() {
            let messages = body
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            if body
                .errors
                .iter()
                .all(|e| e.kind.as_deref() == Some("NOT_FOUND"))
            {
                return Err(HubError::NotFound(messages));
            }
            return Err(HubError::RemoteProtocol(format!("GraphQL query errors: {}", messages)));
        }

        body.data
            .ok_or_else(|| HubError::protocol("GraphQL response has neither data nor errors"))
    }
}

/// Percent-encodes each segment of a slash-separated path, keeping the slashes
///
/// `.` and `..` segments pass through and are collapsed when the URL is
/// built, so callers addressing remote entries must reject them first.
///
/// ```
/// use hubcap::github::client::encode_path;
///
/// assert_eq!(encode_path("docs/my file.md"), "docs/my%20file.md");
/// assert_eq!(encode_path("/src/"), "src");
/// ```
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_base_url_is_a_configuration_error() {
        let err = GithubClient::new(ClientConfig::default().with_base_url("not a url")).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_require_token() {
        let mut config = ClientConfig::default();
        config.token = None;
        let anonymous = GithubClient::new(config).unwrap();
        assert!(anonymous.require_token("discussions").unwrap_err().is_configuration());

        let authenticated = GithubClient::new(ClientConfig::default().with_token("t")).unwrap();
        assert!(authenticated.require_token("discussions").is_ok());
    }

    #[test]
    fn test_url_for_joins_cleanly() {
        let client =
            GithubClient::new(ClientConfig::default().with_base_url("http://localhost:1/api/")).unwrap();
        assert_eq!(client.url_for("/repos/a/b"), "http://localhost:1/api/repos/a/b");
    }

    #[test]
    fn test_encode_path_drops_empty_segments() {
        assert_eq!(encode_path(""), "");
        assert_eq!(encode_path("a//b"), "a/b");
        assert_eq!(encode_path("feature/x#1"), "feature/x%231");
    }
}
