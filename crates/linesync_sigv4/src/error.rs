//! Error types for request signing.

use thiserror::Error;

/// Result type for signing operations.
pub type SigningResult<T> = Result<T, SigningError>;

/// Errors that can occur while signing a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SigningError {
    /// The request URL has no host to put in the `host` header.
    #[error("url has no host: {0}")]
    MissingHost(String),

    /// A header name is empty or contains characters outside the HTTP token set.
    #[error("invalid header name: {0:?}")]
    InvalidHeaderName(String),

    /// A header value cannot be sent on the wire.
    #[error("invalid value for header {name}")]
    InvalidHeaderValue {
        /// Lower-cased header name.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SigningError::MissingHost("file:///tmp".into());
        assert_eq!(err.to_string(), "url has no host: file:///tmp");

        let err = SigningError::InvalidHeaderValue {
            name: "x-custom".into(),
        };
        assert!(err.to_string().contains("x-custom"));
    }
}
