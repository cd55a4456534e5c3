//! Sync coordinator.
//!
//! The object store has no conditional write, so the read-merge-write cycle
//! of a sync must never interleave with another sync of the same log. The
//! coordinator runs each cycle inside a critical section:
//!
//! ```text
//! idle -> locked:reading -> locked:merging -> locked:writing -> unlocked:responding
//! ```
//!
//! With [`LockStrategy::Global`] one lock covers every user; with
//! [`LockStrategy::PerKey`] each user key has its own lock.

use crate::error::ServerResult;
use crate::log::{merge, split_datums, Checkpoint, UserKey};
use linesync_store::ObjectStore;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// How sync cycles are serialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LockStrategy {
    /// One lock for all users.
    #[default]
    Global,
    /// One lock per user key.
    PerKey,
}

/// A sync request: append `body` to `user`'s log, return what follows `checkpoint`.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    /// Log to sync.
    pub user: UserKey,
    /// Bytes to append, normally whole `\n`-terminated lines.
    pub body: Vec<u8>,
    /// Datums the client already has.
    pub checkpoint: Checkpoint,
}

impl SyncRequest {
    /// Creates a request.
    pub fn new(user: UserKey, body: impl Into<Vec<u8>>, checkpoint: Checkpoint) -> Self {
        Self {
            user,
            body: body.into(),
            checkpoint,
        }
    }

    /// Builds a request from raw query values.
    ///
    /// # Errors
    ///
    /// Returns a client error if the user is missing or the checkpoint is
    /// missing or not an integer.
    pub fn from_params(
        user: Option<&str>,
        checkpoint: Option<&str>,
        body: impl Into<Vec<u8>>,
    ) -> ServerResult<Self> {
        let user = UserKey::parse(user.unwrap_or_default())?;
        let checkpoint = checkpoint.unwrap_or_default().parse()?;
        Ok(Self::new(user, body, checkpoint))
    }
}

/// Result of a sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Datums from the clamped checkpoint onward.
    pub datums: Vec<Vec<u8>>,
    /// Datum count of the merged log.
    pub total: usize,
    /// Checkpoint after clamping.
    pub checkpoint: usize,
}

impl SyncOutcome {
    /// Datums as strings, invalid UTF-8 replaced.
    pub fn to_strings(&self) -> Vec<String> {
        self.datums
            .iter()
            .map(|d| String::from_utf8_lossy(d).into_owned())
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum SyncPhase {
    Reading,
    Merging,
    Writing,
    Responding,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SyncPhase::Reading => "locked:reading",
            SyncPhase::Merging => "locked:merging",
            SyncPhase::Writing => "locked:writing",
            SyncPhase::Responding => "unlocked:responding",
        })
    }
}

enum LockTable {
    Global(Mutex<()>),
    PerKey(Mutex<HashMap<String, Arc<Mutex<()>>>>),
}

impl LockTable {
    fn new(strategy: LockStrategy) -> Self {
        match strategy {
            LockStrategy::Global => LockTable::Global(Mutex::new(())),
            LockStrategy::PerKey => LockTable::PerKey(Mutex::new(HashMap::new())),
        }
    }

    /// Runs `f` while holding the lock that covers `key`.
    fn with_lock<R>(&self, key: &str, f: impl FnOnce() -> R) -> R {
        match self {
            LockTable::Global(lock) => {
                let _guard = lock.lock();
                f()
            }
            LockTable::PerKey(registry) => {
                let lock = Arc::clone(registry.lock().entry(key.to_string()).or_default());
                let result = {
                    let _guard = lock.lock();
                    f()
                };

                // Drop the entry once no other sync holds or waits on it.
                let mut registry = registry.lock();
                if Arc::strong_count(&lock) == 2 {
                    registry.remove(key);
                }
                result
            }
        }
    }
}

/// Serializes sync cycles over an [`ObjectStore`].
///
/// Construct once at startup and share behind an `Arc`.
pub struct SyncCoordinator {
    store: Arc<dyn ObjectStore>,
    locks: LockTable,
    strategy: LockStrategy,
}

impl SyncCoordinator {
    /// Creates a coordinator.
    pub fn new(store: Arc<dyn ObjectStore>, strategy: LockStrategy) -> Self {
        Self {
            store,
            locks: LockTable::new(strategy),
            strategy,
        }
    }

    /// Returns the lock strategy.
    pub fn strategy(&self) -> LockStrategy {
        self.strategy
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Appends the request body to the user's log and returns every datum
    /// from the request checkpoint onward.
    ///
    /// Blocks for the duration of the store round trips. Nothing is retried:
    /// a failed write leaves whatever side effects already happened.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Store`](crate::ServerError::Store) if reading
    /// or writing the log fails.
    pub fn sync(&self, request: &SyncRequest) -> ServerResult<SyncOutcome> {
        let key = request.user.as_str();

        let cycle = || -> ServerResult<(Vec<u8>, usize, usize)> {
            tracing::debug!(user = key, phase = %SyncPhase::Reading);
            let existing = self.store.get(key)?;

            tracing::debug!(user = key, phase = %SyncPhase::Merging, existing = existing.len());
            let merged = merge(existing, &request.body);

            tracing::debug!(user = key, phase = %SyncPhase::Writing, size = merged.len());
            self.store.put(key, &merged)?;

            let total = split_datums(&merged).len();
            let start = request.checkpoint.clamp(total);
            Ok((merged, total, start))
        };
        let (merged, total, start) = self.locks.with_lock(key, cycle)?;

        tracing::debug!(user = key, phase = %SyncPhase::Responding);
        let datums = split_datums(&merged)[start..]
            .iter()
            .map(|d| d.to_vec())
            .collect();

        tracing::info!(
            user = key,
            checkpoint = start,
            uploaded = request.body.len(),
            datums = total,
            "sync"
        );

        Ok(SyncOutcome {
            datums,
            total,
            checkpoint: start,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServerError;
    use linesync_store::{ObjectCache, StoreError, StoreResult};

    fn coordinator(strategy: LockStrategy) -> (SyncCoordinator, Arc<ObjectCache>) {
        let cache = Arc::new(ObjectCache::new());
        let store: Arc<dyn ObjectStore> = cache.clone();
        (SyncCoordinator::new(store, strategy), cache)
    }

    fn request(user: &str, body: &str, checkpoint: i64) -> SyncRequest {
        SyncRequest::new(UserKey::parse(user).unwrap(), body, Checkpoint::new(checkpoint))
    }

    #[test]
    fn first_sync_on_empty_store() {
        let (coordinator, cache) = coordinator(LockStrategy::Global);

        let outcome = coordinator.sync(&request("alice", "a\nb\n", 0)).unwrap();
        assert_eq!(outcome.to_strings(), vec!["a", "b", ""]);
        assert_eq!(outcome.total, 3);
        assert_eq!(cache.lookup("alice").unwrap(), b"a\nb\n");
    }

    #[test]
    fn second_client_learns_first_clients_lines() {
        let (coordinator, _) = coordinator(LockStrategy::Global);

        coordinator.sync(&request("alice", "a\n", 0)).unwrap();
        let outcome = coordinator.sync(&request("alice", "b\n", 1)).unwrap();

        assert_eq!(outcome.to_strings(), vec!["b", ""]);
        assert_eq!(outcome.checkpoint, 1);
    }

    #[test]
    fn read_only_sync_at_end_is_empty() {
        let (coordinator, cache) = coordinator(LockStrategy::Global);
        coordinator.sync(&request("alice", "a\nb\n", 0)).unwrap();

        let outcome = coordinator.sync(&request("alice", "", 3)).unwrap();
        assert!(outcome.datums.is_empty());
        assert_eq!(cache.lookup("alice").unwrap(), b"a\nb\n");
    }

    #[test]
    fn checkpoint_beyond_end_is_clamped() {
        let (coordinator, _) = coordinator(LockStrategy::PerKey);

        let outcome = coordinator.sync(&request("alice", "a\n", 50)).unwrap();
        assert!(outcome.datums.is_empty());
        assert_eq!(outcome.checkpoint, 2);
    }

    #[test]
    fn negative_checkpoint_returns_everything() {
        let (coordinator, _) = coordinator(LockStrategy::Global);

        let outcome = coordinator.sync(&request("alice", "a\n", -4)).unwrap();
        assert_eq!(outcome.to_strings(), vec!["a", ""]);
    }

    #[test]
    fn from_params_validates_before_sync() {
        assert!(matches!(
            SyncRequest::from_params(Some("alice"), Some("x"), b"a\n".to_vec()),
            Err(ServerError::InvalidCheckpoint(_))
        ));
        assert!(matches!(
            SyncRequest::from_params(Some("alice"), None, Vec::new()),
            Err(ServerError::InvalidCheckpoint(_))
        ));
        assert!(matches!(
            SyncRequest::from_params(None, Some("0"), Vec::new()),
            Err(ServerError::InvalidRequest(_))
        ));

        let request = SyncRequest::from_params(Some("al=ice"), Some("2"), b"x\n".to_vec()).unwrap();
        assert_eq!(request.user.as_str(), "alice");
        assert_eq!(request.checkpoint, Checkpoint::new(2));
    }

    struct BrokenStore;

    impl ObjectStore for BrokenStore {
        fn get(&self, _key: &str) -> StoreResult<Vec<u8>> {
            Err(StoreError::status(500, b"internal"))
        }

        fn put(&self, _key: &str, _value: &[u8]) -> StoreResult<()> {
            Err(StoreError::status(500, b"internal"))
        }
    }

    #[test]
    fn store_failure_aborts_sync() {
        let coordinator = SyncCoordinator::new(Arc::new(BrokenStore), LockStrategy::Global);

        let err = coordinator.sync(&request("alice", "a\n", 0)).unwrap_err();
        assert!(matches!(err, ServerError::Store(_)));

        // The lock is released after a failure.
        assert!(coordinator.sync(&request("alice", "a\n", 0)).is_err());
    }

    fn registered_locks(coordinator: &SyncCoordinator) -> usize {
        match &coordinator.locks {
            LockTable::PerKey(registry) => registry.lock().len(),
            LockTable::Global(_) => panic!("expected per-key locks"),
        }
    }

    #[test]
    fn per_key_locks_are_released_after_sync() {
        let (coordinator, _) = coordinator(LockStrategy::PerKey);
        coordinator.sync(&request("alice", "a\n", 0)).unwrap();
        coordinator.sync(&request("alice", "b\n", 0)).unwrap();
        coordinator.sync(&request("bob", "c\n", 0)).unwrap();

        assert_eq!(registered_locks(&coordinator), 0);
    }

    #[test]
    fn per_key_registry_drains_after_concurrent_syncs() {
        let (coordinator, cache) = coordinator(LockStrategy::PerKey);

        std::thread::scope(|s| {
            for user in ["alice", "alice", "bob", "bob", "carol"] {
                let coordinator = &coordinator;
                s.spawn(move || {
                    for _ in 0..20 {
                        coordinator.sync(&request(user, "x\n", 0)).unwrap();
                    }
                });
            }
        });

        assert_eq!(registered_locks(&coordinator), 0);
        assert_eq!(cache.lookup("alice").unwrap().len(), 80);
        assert_eq!(cache.lookup("bob").unwrap().len(), 80);
        assert_eq!(cache.lookup("carol").unwrap().len(), 40);
    }
}
