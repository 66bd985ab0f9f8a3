//! Error types for PostgreSQL checkpointer

use thiserror::Error;

/// Errors that can occur when using the PostgreSQL checkpointer
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// PostgreSQL connection or query error
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Checkpoint not found
    #[error("Checkpoint not found: {0}")]
    NotFound(String),

    /// Generic error
    #[error("{0}")]
    Generic(String),
}

/// Result type for PostgreSQL checkpointer operations
///
/// This type alias is provided for convenience when working with the error types
/// defined in this module. Used in tests and available for external consumers.
#[allow(dead_code)] // Public API: Used in tests; available for external use
pub type Result<T> = std::result::Result<T, Error>;

/// Convert PostgreSQL checkpointer errors to DashFlow errors
impl From<Error> for dashflow::Error {
    fn from(err: Error) -> Self {
        use dashflow::error::CheckpointError;
        let checkpoint_err = match err {
            Error::Postgres(e) => CheckpointError::ConnectionLost {
                backend: "postgres".to_string(),
                reason: e.to_string(),
            },
            Error::Serialization(e) => CheckpointError::SerializationFailed {
                reason: e.to_string(),
            },
            Error::Json(e) => CheckpointError::SerializationFailed {
                reason: format!("JSON: {}", e),
            },
            Error::NotFound(id) => CheckpointError::NotFound {
                checkpoint_id: id,
            },
            Error::Generic(msg) => CheckpointError::Other(msg),
        };
        dashflow::Error::Checkpoint(checkpoint_err)
    }
}
