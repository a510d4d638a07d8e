//! In-process cache for API responses
//!
//! Holds immutable snapshots of response payloads with a per-entry TTL.
//! Expiry is checked lazily on read; stale entries are overwritten by the
//! next fetch rather than swept by a background task.

pub mod key;

pub use key::cache_key;

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde_json::Value;

/// Entry lifetime used when a request enables caching without naming a TTL.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

struct CacheEntry {
    value: Value,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_fresh(&self) -> bool {
        self.stored_at.elapsed() < self.ttl
    }
}

/// TTL key/value cache for response payloads.
///
/// Entries are replaced wholesale, never mutated in place, so concurrent
/// writers to the same key race harmlessly: last write wins.
#[derive(Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached value, treating an expired entry as absent
    /// (and dropping it on the way out).
    pub fn get(&self, cache_key: &str) -> Option<Value> {
        let Ok(mut entries) = self.entries.lock() else {
            return None;
        };

        match entries.get(cache_key) {
            Some(entry) if entry.is_fresh() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(cache_key);
                None
            }
            None => None,
        }
    }

    /// Store a value snapshot, replacing any previous entry for the key.
    pub fn put(&self, cache_key: &str, value: Value, ttl: Duration) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                cache_key.to_string(),
                CacheEntry {
                    value,
                    stored_at: Instant::now(),
                    ttl,
                },
            );
        }
    }

    /// Drop a single entry by key.
    pub fn invalidate(&self, cache_key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(cache_key);
        }
    }

    /// Drop every entry.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    /// Number of stored entries, fresh or not.
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
