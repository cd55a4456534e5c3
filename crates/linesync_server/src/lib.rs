//! # Linesync Server
//!
//! HTTP sync server for per-user append-only logs.
//!
//! This crate provides:
//! - The log model: datums, user keys, checkpoints and merging
//! - A sync coordinator that serializes read-merge-write cycles
//! - axum handlers for the sync endpoint and the static pages
//! - The `linesync` binary
//!
//! # Protocol
//!
//! A client sends `POST /?user=<key>&checkpoint=<n>` with the lines it has
//! not uploaded yet. The server appends them to the user's log and answers
//! with every datum from position `n` onward, the client's own lines
//! included:
//!
//! ```
//! use linesync_server::{Checkpoint, LockStrategy, SyncCoordinator, SyncRequest, UserKey};
//! use linesync_store::ObjectCache;
//! use std::sync::Arc;
//!
//! let coordinator = SyncCoordinator::new(Arc::new(ObjectCache::new()), LockStrategy::Global);
//!
//! let user = UserKey::parse("alice").unwrap();
//! let request = SyncRequest::new(user, "a\nb\n", Checkpoint::new(0));
//! let outcome = coordinator.sync(&request).unwrap();
//!
//! assert_eq!(outcome.to_strings(), vec!["a", "b", ""]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod assets;
mod config;
mod coordinator;
mod error;
mod handler;
mod log;
mod response;
mod server;

pub use assets::{StaticAssets, INDEX_FILE, MANIFEST_FILE, SERVICE_WORKER_FILE};
pub use config::{CliArgs, ServerConfig, DEFAULT_PORT};
pub use coordinator::{LockStrategy, SyncCoordinator, SyncOutcome, SyncRequest};
pub use error::{ServerError, ServerResult};
pub use handler::{AppState, SyncParams};
pub use log::{datums_since, join_datums, merge, split_datums, Checkpoint, UserKey, SEPARATOR};
pub use response::{ResponseFormat, SyncResponse, CONTENT_TYPE_TEXT};
pub use server::{router, SyncServer};
