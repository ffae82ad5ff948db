//! Marker state persistence boundary.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::core::time::{TimeValue, ZERO};

/// Persisted in/out pair of one clip, keyed by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerState {
    pub in_point: TimeValue,
    pub out_point: TimeValue,
}

impl MarkerState {
    pub fn new(in_point: TimeValue, out_point: TimeValue) -> Self {
        Self { in_point, out_point }
    }

    /// State used when nothing is persisted: clip start to clip end.
    pub fn defaults_for(duration: TimeValue) -> Self {
        Self::new(ZERO, duration.max(ZERO))
    }

    pub fn span(&self) -> TimeValue {
        self.out_point.saturating_sub(self.in_point)
    }
}

impl fmt::Display for MarkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} - {}]", self.in_point, self.out_point)
    }
}

/// Error type for settings storage
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings could not be encoded or decoded: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("settings store rejected the write: {0}")]
    Rejected(String),
}

/// A failed save. The in-memory pair stays authoritative.
#[derive(Debug, thiserror::Error)]
#[error("marker state for '{key}' was not saved: {source}")]
pub struct PersistenceWarning {
    pub key: String,
    #[source]
    pub source: PersistenceError,
}

/// Where marker pairs are persisted, keyed by a per-clip settings key.
pub trait MarkerStateStore: Send + Sync + fmt::Debug {
    /// `Ok(None)` means nothing has been saved under `key`.
    fn load_marker_state(&self, key: &str) -> Result<Option<MarkerState>, PersistenceError>;

    fn save_marker_state(&self, key: &str, state: MarkerState) -> Result<(), PersistenceError>;
}

/// In-process store. Can be told to refuse writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, MarkerState>>,
    reject_saves: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_reject_saves(&self, reject: bool) {
        self.reject_saves.store(reject, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MarkerStateStore for MemoryStore {
    fn load_marker_state(&self, key: &str) -> Result<Option<MarkerState>, PersistenceError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).copied())
    }

    fn save_marker_state(&self, key: &str, state: MarkerState) -> Result<(), PersistenceError> {
        if self.reject_saves.load(Ordering::Relaxed) {
            return Err(PersistenceError::Rejected(format!("writes to '{key}' are disabled")));
        }
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), state);
        Ok(())
    }
}
