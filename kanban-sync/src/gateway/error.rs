//! Remote store failures

use thiserror::Error;

/// Errors returned by a [`CollectionGateway`](super::CollectionGateway)
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The remote store refused the write against its current state
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("remote API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Failure produced on purpose by an in-memory remote
    #[error("injected failure: {0}")]
    Injected(String),
}

impl GatewayError {
    /// Whether the same request may succeed if sent again later
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Transport(_) | Self::Injected(_) => true,
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
