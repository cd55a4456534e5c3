//! # linesync Store
//!
//! Object-store access for linesync.
//!
//! Stores are **opaque blob stores**: a key maps to a byte blob that is read
//! and overwritten whole. They do not interpret the logs kept in them.
//!
//! ## Design Principles
//!
//! - Only `GET` and `PUT` of single keys
//! - "Not found" reads as an empty blob, never as an error
//! - Every `put` also lands in a process-local cache, which serves reads
//!   when no credentials are configured or the store is unreachable
//! - The HTTP client is behind [`HttpTransport`] so tests never touch the network
//! - Must be `Send + Sync` for concurrent access
//!
//! ## Available Stores
//!
//! - [`ObjectStoreClient`] - S3-style store over signed HTTPS
//! - [`ObjectCache`] - In-memory, for testing and local runs
//!
//! ## Example
//!
//! ```rust
//! use linesync_store::{ObjectStore, ObjectStoreClient, StoreConfig};
//!
//! // No credentials: the client works purely against its cache.
//! let store = ObjectStoreClient::new(StoreConfig::local()).unwrap();
//! assert!(store.get("alice").unwrap().is_empty());
//!
//! store.put("alice", b"a\nb\n").unwrap();
//! assert_eq!(store.get("alice").unwrap(), b"a\nb\n");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod cache;
mod client;
mod config;
mod error;
mod sniff;
mod store;
mod transport;

pub use cache::ObjectCache;
pub use client::ObjectStoreClient;
pub use config::{StoreConfig, DEFAULT_DOMAIN, DEFAULT_REGION, DEFAULT_SERVICE};
pub use error::{StoreError, StoreResult};
pub use linesync_sigv4::Credentials;
pub use sniff::{sniff_content_type, OCTET_STREAM};
pub use store::ObjectStore;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};
