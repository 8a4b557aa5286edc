//! Bounded, expiring cache of resolved result pages.
//!
//! Eviction is by insertion order: once the cache holds more than
//! `capacity` entries the earliest-inserted key goes. Expiry is checked
//! lazily when a key is looked up.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::catalog::Item;

use super::key::RequestKey;

/// Default number of cached pages
pub const DEFAULT_CACHE_CAPACITY: usize = 50;

/// Default lifetime of a cached page
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// A cache handle that several orchestrators may hold on purpose.
pub type SharedResultCache = Arc<Mutex<ResultCache>>;

#[derive(Debug, Clone)]
struct CacheEntry {
    items: Vec<Item>,
    total: usize,
    expires_at: Instant,
}

/// A page served from the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPage {
    pub items: Vec<Item>,
    pub total: usize,
}

#[derive(Debug)]
pub struct ResultCache {
    capacity: usize,
    ttl: Duration,
    entries: HashMap<RequestKey, CacheEntry>,
    /// Keys in insertion order, oldest first
    order: VecDeque<RequestKey>,
}

impl ResultCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            ttl,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Wrap a new cache in a shareable handle.
    pub fn shared(capacity: usize, ttl: Duration) -> SharedResultCache {
        Arc::new(Mutex::new(Self::new(capacity, ttl)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an unexpired page. Expired entries are dropped on the way.
    pub fn get(&mut self, key: &RequestKey) -> Option<CachedPage> {
        let expired = match self.entries.get(key) {
            None => return None,
            Some(entry) => entry.expires_at <= Instant::now(),
        };

        if expired {
            tracing::trace!(key = %key, "cache entry expired");
            self.remove(key);
            return None;
        }

        self.entries.get(key).map(|entry| CachedPage {
            items: entry.items.clone(),
            total: entry.total,
        })
    }

    /// Store a page. Replacing a key moves it to the newest position.
    pub fn insert(&mut self, key: RequestKey, items: Vec<Item>, total: usize) {
        if self.entries.contains_key(&key) {
            self.order.retain(|k| k != &key);
        }

        let entry = CacheEntry {
            items,
            total,
            expires_at: Instant::now() + self.ttl,
        };
        self.order.push_back(key.clone());
        self.entries.insert(key, entry);

        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            tracing::trace!(key = %oldest, "evicting oldest cache entry");
            self.entries.remove(&oldest);
        }
    }

    fn remove(&mut self, key: &RequestKey) {
        self.entries.remove(key);
        self.order.retain(|k| k != key);
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL)
    }
}
