//! The per-user append-only log and how uploads merge into it.
//!
//! A log is a byte blob read as a sequence of datums separated by `\n`.
//! Splitting never drops anything: `n` newlines give `n + 1` datums, so a
//! log ending in `\n` has a trailing empty datum and the empty log has one
//! empty datum. [`join_datums`] is the exact inverse of [`split_datums`].

use crate::error::{ServerError, ServerResult};
use std::fmt;
use std::str::FromStr;

/// Datum separator.
pub const SEPARATOR: u8 = b'\n';

/// Key of one user's log.
///
/// Every `=` is removed from the raw value; clients' query strings sometimes
/// carry padding from base64-ish identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserKey(String);

impl UserKey {
    /// Sanitizes `raw` into a key.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidRequest`] if nothing is left after
    /// sanitizing.
    pub fn parse(raw: &str) -> ServerResult<Self> {
        let key: String = raw.chars().filter(|c| *c != '=').collect();
        if key.is_empty() {
            return Err(ServerError::InvalidRequest("missing user key".into()));
        }
        Ok(Self(key))
    }

    /// Returns the key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A client's cursor: "I have seen the first N datums".
///
/// Any integer is accepted; [`Checkpoint::clamp`] saturates it into range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Checkpoint(i64);

impl Checkpoint {
    /// Creates a checkpoint.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    pub fn get(self) -> i64 {
        self.0
    }

    /// Saturates the checkpoint into `[0, len]`.
    pub fn clamp(self, len: usize) -> usize {
        if self.0 <= 0 {
            return 0;
        }
        usize::try_from(self.0).map_or(len, |n| n.min(len))
    }
}

impl FromStr for Checkpoint {
    type Err = ServerError;

    fn from_str(s: &str) -> ServerResult<Self> {
        s.parse::<i64>()
            .map(Self)
            .map_err(|e| ServerError::InvalidCheckpoint(format!("{s:?}: {e}")))
    }
}

/// Appends `uploaded` to `existing`.
///
/// Plain byte concatenation: uploads are expected to be whole lines.
pub fn merge(mut existing: Vec<u8>, uploaded: &[u8]) -> Vec<u8> {
    existing.extend_from_slice(uploaded);
    existing
}

/// Splits a log into its datums.
pub fn split_datums(log: &[u8]) -> Vec<&[u8]> {
    log.split(|b| *b == SEPARATOR).collect()
}

/// Joins datums back into a log.
pub fn join_datums<D: AsRef<[u8]>>(datums: &[D]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, datum) in datums.iter().enumerate() {
        if i > 0 {
            out.push(SEPARATOR);
        }
        out.extend_from_slice(datum.as_ref());
    }
    out
}

/// Returns the datums of `log` from `checkpoint` onward.
pub fn datums_since(log: &[u8], checkpoint: Checkpoint) -> Vec<&[u8]> {
    let mut datums = split_datums(log);
    let start = checkpoint.clamp(datums.len());
    datums.split_off(start)
}
