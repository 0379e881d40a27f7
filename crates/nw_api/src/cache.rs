//! Read-through response cache. Entries are immutable for their TTL window
//! and never invalidated on write; staleness up to the TTL is accepted, and
//! population is last-writer-wins.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::RwLock;

/// TTL for list responses, keyed per (user, filter set, page).
pub const LIST_TTL: Duration = Duration::from_secs(60);
/// Longer, independent TTL for single-article lookups.
pub const ARTICLE_TTL: Duration = Duration::from_secs(600);

struct Entry {
    stored_at: Instant,
    ttl: Duration,
    value: Value,
}

impl Entry {
    fn is_fresh(&self) -> bool {
        self.stored_at.elapsed() < self.ttl
    }
}

pub struct ResponseCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.is_fresh())
            .map(|entry| entry.value.clone())
    }

    pub async fn put(&self, key: String, value: Value, ttl: Duration) {
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.is_fresh());
        entries.insert(
            key,
            Entry {
                stored_at: Instant::now(),
                ttl,
                value,
            },
        );
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}
