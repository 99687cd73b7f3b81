//! Error types for the sync engine

use crate::gateway::GatewayError;
use crate::reconcile::MutationKind;
use thiserror::Error;

/// Result type for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that can occur while mutating or synchronizing a board
#[derive(Debug, Error)]
pub enum SyncError {
    /// List not present in the local board
    #[error("list not found: {id}")]
    ListNotFound { id: String },

    /// Card not present in the local board
    #[error("card not found: {id}")]
    CardNotFound { id: String },

    /// Placeholder entity no longer present in the local board
    #[error("placeholder not found: {id}")]
    PlaceholderNotFound { id: String },

    /// Operation needs a server-assigned identity the entity does not have yet
    #[error("{resource} '{id}' has not been persisted yet")]
    NotPersisted { resource: String, id: String },

    /// Invalid field value
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// A remote write failed and the optimistic change was rolled back
    #[error("{kind} rejected by remote store: {source}")]
    Rejected {
        kind: MutationKind,
        #[source]
        source: GatewayError,
    },

    /// Remote call failed outside of an optimistic mutation (e.g. refresh)
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Invalid or unloadable configuration
    #[error("configuration error: {0}")]
    Config(#[from] kanban_sync_config::ConfigError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// Create a list-not-found error
    pub fn list_not_found(id: impl ToString) -> Self {
        Self::ListNotFound { id: id.to_string() }
    }

    /// Create a card-not-found error
    pub fn card_not_found(id: impl ToString) -> Self {
        Self::CardNotFound { id: id.to_string() }
    }

    /// Create a not-persisted error
    pub fn not_persisted(resource: impl Into<String>, id: impl ToString) -> Self {
        Self::NotPersisted {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether repeating the gesture later may succeed.
    ///
    /// Rolled-back mutations are never retried by the engine itself.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Rejected { source, .. } | Self::Gateway(source) => source.is_transient(),
            _ => false,
        }
    }
}
