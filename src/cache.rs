//! In-process TTL cache for scraped results.
//!
//! Entries expire after a per-write TTL. There is no capacity bound, no
//! background sweeper and no explicit invalidation: an expired entry reads as
//! absent and is dropped the next time someone looks it up.
//!
//! The clock is `tokio::time::Instant` so tests can pause and advance time.

use crate::models::Article;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// A value the orchestrator stores: a whole aggregate or a single article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cached {
    Articles(Vec<Article>),
    Article(Article),
}

/// Key-value store with per-entry expiry.
///
/// `get` cannot tell "never set" from "expired"; both mean "go fetch it".
pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> Option<Cached>;
    /// Replace whatever is stored under `key`. Never fails.
    fn set(&self, key: &str, value: Cached, ttl: Duration);
}

#[derive(Debug)]
struct Entry {
    value: Cached,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// [`Cache`] guarded by a single readers-writer lock.
///
/// Lookups share the read lock; writes and lazy eviction take the write lock.
#[derive(Debug, Default)]
pub struct TtlCache {
    items: RwLock<HashMap<String, Entry>>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn evict_if_expired(&self, key: &str) {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        // A writer may have refreshed the entry since we released the read lock.
        if items.get(key).is_some_and(|e| !e.is_live(Instant::now())) {
            items.remove(key);
            debug!(%key, "Evicted expired cache entry");
        }
    }
}

impl Cache for TtlCache {
    fn get(&self, key: &str) -> Option<Cached> {
        {
            let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
            match items.get(key) {
                None => {
                    debug!(%key, "Cache miss");
                    return None;
                }
                Some(entry) if entry.is_live(Instant::now()) => {
                    debug!(%key, "Cache hit");
                    return Some(entry.value.clone());
                }
                Some(_) => {}
            }
        }

        debug!(%key, "Cache entry expired");
        self.evict_if_expired(key);
        None
    }

    fn set(&self, key: &str, value: Cached, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), Entry { value, expires_at });
        debug!(%key, ttl_secs = ttl.as_secs(), "Cache set");
    }
}
