//! Error types for remote node execution

use thiserror::Error;

/// Result type for remote node operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during remote node execution
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// gRPC transport error
    #[error("gRPC transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// gRPC status error
    #[error("gRPC status error: {0}")]
    Status(Box<tonic::Status>),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Node not found on remote server
    #[error("Node '{0}' not found on remote server")]
    NodeNotFound(String),

    /// Execution error from remote node
    #[error("Remote node execution failed: {0}")]
    RemoteExecution(String),

    /// Timeout error
    #[error("Remote node execution timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Health check failed
    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),

    /// Retry exhausted
    #[error("Retry exhausted after {0} attempts")]
    RetryExhausted(usize),

    /// Invalid response from server
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// `DashFlow` error
    #[error("DashFlow error: {0}")]
    DashFlow(#[from] dashflow::error::Error),
}

impl Error {
    /// Check if this error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            // Network and temporary failures are retryable
            Error::Transport(_) => true,
            Error::Status(status) => {
                matches!(
                    status.code(),
                    tonic::Code::Unavailable
                        | tonic::Code::DeadlineExceeded
                        | tonic::Code::ResourceExhausted
                        | tonic::Code::Aborted
                )
            }
            Error::Timeout(_) => true,
            Error::RemoteExecution(_) => false, // Remote execution errors are not retryable by default
            Error::RetryExhausted(_) => false,
            _ => false,
        }
    }
}

impl From<tonic::Status> for Error {
    fn from(status: tonic::Status) -> Self {
        Error::Status(Box::new(status))
    }
}
