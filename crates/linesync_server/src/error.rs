//! Error types for the sync server.

use linesync_store::StoreError;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the sync server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The checkpoint is not an integer.
    #[error("invalid checkpoint: {0}")]
    InvalidCheckpoint(String),

    /// Invalid request format.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The object store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Returns true if the client sent something unusable.
    ///
    /// Client errors are always detected before the log is touched.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServerError::InvalidCheckpoint(_) | ServerError::InvalidRequest(_)
        )
    }

    /// Returns true if the server or the store is at fault.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            ServerError::Store(_) | ServerError::Internal(_) | ServerError::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classification() {
        assert!(ServerError::InvalidCheckpoint("\"x\"".into()).is_client_error());
        assert!(ServerError::InvalidRequest("bad".into()).is_client_error());
        assert!(ServerError::Internal("oops".into()).is_server_error());
        assert!(ServerError::Store(StoreError::Transport("down".into())).is_server_error());
        assert!(!ServerError::InvalidRequest("bad".into()).is_server_error());
    }

    #[test]
    fn store_errors_display_unchanged() {
        let err: ServerError = StoreError::status(503, b"slow down").into();
        assert_eq!(err.to_string(), "store error: 503: slow down");
    }

    #[test]
    fn checkpoint_error_display() {
        let err = ServerError::InvalidCheckpoint("\"abc\": invalid digit found in string".into());
        assert_eq!(
            err.to_string(),
            "invalid checkpoint: \"abc\": invalid digit found in string"
        );
    }
}
