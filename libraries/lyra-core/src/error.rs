//! Error types for remote collaborators

use thiserror::Error;

/// Result type alias using `ServiceError`
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Failure reported by a remote collaborator (favorites, play history)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The remote store could not be reached
    #[error("Network error: {0}")]
    Network(String),

    /// The remote store refused the request for this identity
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The row the request referred to does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The remote store rejected the request
    #[error("Remote store rejected request: {0}")]
    Rejected(String),
}

impl ServiceError {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a permission denied error
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a rejection error
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }
}
