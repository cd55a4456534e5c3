//! # linesync SigV4
//!
//! Request signing for the object store behind linesync.
//!
//! This crate implements the canonical-request signing scheme used by S3
//! (AWS Signature Version 4, `AWS4-HMAC-SHA256`) from scratch:
//!
//! 1. hash the payload (hex SHA-256)
//! 2. canonicalize method, path, query and headers
//! 3. build the string to sign over the credential scope
//! 4. derive a date/region/service scoped signing key (four HMAC-SHA256 steps)
//! 5. sign and assemble the `Authorization` header
//!
//! The output must match the store byte for byte, so every step is exposed
//! for inspection on [`SignedRequest`].
//!
//! ## Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use linesync_sigv4::{Credentials, RequestSigner, SignableRequest};
//! use url::Url;
//!
//! let signer = RequestSigner::new(
//!     Credentials::new("AKIDEXAMPLE", "secret"),
//!     "us-east-1",
//!     "s3",
//! );
//! let url = Url::parse("https://bucket.s3.amazonaws.com/alice").unwrap();
//! let request = SignableRequest::new("GET", &url);
//! let time = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
//!
//! let signed = signer.sign(&request, time).unwrap();
//! assert!(signed
//!     .authorization()
//!     .starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20240102/us-east-1/s3/aws4_request"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod canonical;
mod credentials;
mod error;
mod key;
mod signer;

pub use canonical::{canonical_query, uri_encode};
pub use credentials::Credentials;
pub use error::{SigningError, SigningResult};
pub use key::{derive_signing_key, hash_payload, SigningKey, EMPTY_PAYLOAD_SHA256};
pub use signer::{RequestSigner, SignableRequest, SignedRequest, ALGORITHM};
