//! Object store trait definition.

use crate::error::StoreResult;

/// A key/blob store.
///
/// Stores are **opaque blob stores**: `put` overwrites the whole blob under a
/// key and `get` returns it whole. There is no conditional write, so callers
/// that read-modify-write must serialize themselves.
///
/// # Invariants
///
/// - `get` of a key that was never written returns an empty blob, not an error
/// - `get` after a successful `put` returns exactly the bytes put
/// - Stores must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::ObjectStoreClient`] - S3-style store over signed HTTPS
/// - [`super::ObjectCache`] - In-memory, for testing
pub trait ObjectStore: Send + Sync {
    /// Reads the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store refuses the read or cannot be reached
    /// (and no fallback copy exists).
    fn get(&self, key: &str) -> StoreResult<Vec<u8>>;

    /// Stores `value` under `key`, replacing any previous blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the store refuses the write or cannot be reached.
    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()>;
}
