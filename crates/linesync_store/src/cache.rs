//! In-memory object cache.

use crate::error::StoreResult;
use crate::store::ObjectStore;
use parking_lot::RwLock;
use std::collections::HashMap;

/// An in-memory key/blob map.
///
/// Used by [`super::ObjectStoreClient`] as its fallback copy of everything it
/// has written, and usable on its own as a store for:
/// - Unit tests
/// - Local runs without store credentials
///
/// Contents are never persisted and are lost on restart.
///
/// # Thread Safety
///
/// The cache is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use linesync_store::{ObjectCache, ObjectStore};
///
/// let cache = ObjectCache::new();
/// cache.put("alice", b"a\n").unwrap();
/// assert_eq!(cache.get("alice").unwrap(), b"a\n");
/// assert!(cache.get("bob").unwrap().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct ObjectCache {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl ObjectCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the blob cached under `key`, if any.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.read().get(key).cloned()
    }

    /// Caches `value` under `key`.
    pub fn insert(&self, key: &str, value: Vec<u8>) {
        self.entries.write().insert(key.to_string(), value);
    }

    /// Returns true if a blob is cached under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Returns the number of cached keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl ObjectStore for ObjectCache {
    fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        Ok(self.lookup(key).unwrap_or_default())
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.insert(key, value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_new_is_empty() {
        let cache = ObjectCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
        assert!(cache.lookup("alice").is_none());
    }

    #[test]
    fn cache_insert_overwrites() {
        let cache = ObjectCache::new();
        cache.insert("alice", b"a\n".to_vec());
        cache.insert("alice", b"a\nb\n".to_vec());

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup("alice").unwrap(), b"a\nb\n");
    }

    #[test]
    fn cache_store_missing_key_is_empty() {
        let cache = ObjectCache::new();
        assert_eq!(cache.get("nobody").unwrap(), Vec::<u8>::new());
        assert!(!cache.contains("nobody"));
    }

    #[test]
    fn cache_keys_are_independent() {
        let cache = ObjectCache::new();
        cache.put("alice", b"a").unwrap();
        cache.put("bob", b"b").unwrap();

        assert_eq!(cache.get("alice").unwrap(), b"a");
        assert_eq!(cache.get("bob").unwrap(), b"b");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn cache_shared_across_threads() {
        let cache = ObjectCache::new();
        std::thread::scope(|s| {
            for i in 0..8 {
                let cache = &cache;
                s.spawn(move || cache.insert(&format!("user-{i}"), vec![i as u8]));
            }
        });
        assert_eq!(cache.len(), 8);
        assert_eq!(cache.lookup("user-3").unwrap(), vec![3]);
    }
}
