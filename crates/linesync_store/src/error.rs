//! Error types for object-store operations.

use linesync_sigv4::SigningError;
use thiserror::Error;

/// Result type for object-store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during object-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request could not be signed.
    #[error("signing error: {0}")]
    Signing(#[from] SigningError),

    /// The store could not be reached, or the exchange broke off.
    #[error("transport error: {0}")]
    Transport(String),

    /// The store answered with a non-success status.
    #[error("store error: {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, lossily decoded.
        body: String,
    },

    /// The object key cannot be addressed.
    #[error("invalid object key: {0:?}")]
    InvalidKey(String),

    /// The store configuration cannot produce a valid endpoint.
    #[error("invalid store configuration: {0}")]
    Config(String),
}

impl StoreError {
    /// Creates a status error from a response.
    pub fn status(status: u16, body: &[u8]) -> Self {
        Self::Status {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }

    /// Returns true if the store was unreachable rather than refusing the request.
    pub fn is_transport(&self) -> bool {
        matches!(self, StoreError::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display() {
        let err = StoreError::status(403, b"<Error><Code>SignatureDoesNotMatch</Code></Error>");
        let msg = err.to_string();
        assert!(msg.starts_with("store error: 403: "));
        assert!(msg.contains("SignatureDoesNotMatch"));
    }

    #[test]
    fn classification() {
        assert!(StoreError::Transport("connection refused".into()).is_transport());
        assert!(!StoreError::status(500, b"").is_transport());
        assert!(!StoreError::InvalidKey(String::new()).is_transport());
    }

    #[test]
    fn signing_error_converts() {
        let err: StoreError = SigningError::MissingHost("x".into()).into();
        assert!(matches!(err, StoreError::Signing(_)));
    }
}
