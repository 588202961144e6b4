//! Command history - bounded, newest first
//!
//! The whole list is stored as one JSON array under `HISTORY_KEY`. Appends
//! are read-modify-write and serialized by a lock so concurrent callers in
//! one process never drop each other's entries.

use crate::engine::SynthesisResult;
use crate::error::Result;
use crate::store::KeyValueStore;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

pub const HISTORY_KEY: &str = "command-history";
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// A history entry is a synthesis result, stored verbatim
pub type HistoryEntry = SynthesisResult;

pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    capacity: usize,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_capacity(store, DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(store: Arc<dyn KeyValueStore>, capacity: usize) -> Self {
        Self {
            store,
            capacity,
            write_lock: Mutex::new(()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Prepend `entry` and evict the oldest entries beyond capacity
    pub fn append(&self, entry: HistoryEntry) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut entries = self.list();
        entries.insert(0, entry);
        entries.truncate(self.capacity);

        let json = serde_json::to_string(&entries)?;
        self.store.set(HISTORY_KEY, &json).map_err(|e| {
            warn!("Failed to save command to history: {}", e);
            e
        })
    }

    /// Stored entries, newest first. Missing or corrupt data reads as empty.
    pub fn list(&self) -> Vec<HistoryEntry> {
        let Some(raw) = self.store.get(HISTORY_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Ignoring unreadable command history: {}", e);
                Vec::new()
            }
        }
    }

    pub fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.store.remove(HISTORY_KEY)
    }
}
