//! Error types shared by the client, the views and the router.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HubError>;

/// Errors surfaced while navigating GitHub resources.
///
/// `NotFound` is the only kind callers are expected to absorb (see
/// [`LazyKeyedView::contains`](crate::views::LazyKeyedView::contains)); every
/// other kind is propagated unchanged.
#[derive(Debug, Error)]
pub enum HubError {
    /// The requested key does not exist at this level
    #[error("not found: {0}")]
    NotFound(String),

    /// The remote answered, but with an error payload or an unexpected shape
    #[error("remote protocol error: {0}")]
    RemoteProtocol(String),

    /// The HTTP exchange itself failed
    #[error("transport error{}: {message}", status_suffix(.status))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// A required credential or parameter is missing or invalid
    #[error("configuration error: {0}")]
    Configuration(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

impl HubError {
    pub fn not_found(what: impl Into<String>) -> Self {
        HubError::NotFound(what.into())
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        HubError::RemoteProtocol(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        HubError::Configuration(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, HubError::NotFound(_))
    }

    pub fn is_remote_protocol(&self) -> bool {
        matches!(self, HubError::RemoteProtocol(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, HubError::Transport { .. })
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, HubError::Configuration(_))
    }

    /// HTTP status attached to a transport failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            HubError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for HubError {
    fn from(e: reqwest::Error) -> Self {
        HubError::Transport {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for HubError {
    fn from(e: serde_json::Error) -> Self {
        HubError::RemoteProtocol(format!("unexpected response shape: {}", e))
    }
}
