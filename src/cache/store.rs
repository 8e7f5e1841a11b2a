//! In-memory request cache with lazy TTL expiry
//!
//! Provides a `RequestCache` that keeps fetched responses in memory, keyed by
//! [`generate_key`](super::generate_key). Entries go stale once their TTL has
//! elapsed, but staleness is only discovered on the next `get` of that key or
//! by an explicit invalidation; there is no background sweep.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::clock::{Clock, SystemClock};
use super::policy::{Action, CacheConfig, Invalidation, TtlTier};

/// A cached payload with its freshness window
struct CacheEntry {
    /// The cached payload, stored as-is
    value: Arc<dyn Any + Send + Sync>,
    /// When the payload was stored
    stored_at: DateTime<Utc>,
    /// How long the payload stays fresh
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        // A clock that went backwards counts as no time elapsed.
        let elapsed = (now - self.stored_at).to_std().unwrap_or_default();
        elapsed >= self.ttl
    }
}

/// Process-wide response cache shared by every service
///
/// Create one per session and hand it to each service as an `Arc<RequestCache>`.
/// Each operation takes the internal lock once and never holds it across an
/// `.await`, so every call is atomic from the caller's point of view.
///
/// Concurrent misses on the same key are not coalesced: each caller runs its
/// own fetch, and the last one to finish wins.
pub struct RequestCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
}

impl Default for RequestCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl RequestCache {
    /// Creates an empty cache using the wall clock
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates an empty cache with a custom time source
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            config,
            clock,
        }
    }

    /// The TTL configuration this cache was built with
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // Entries are replaced wholesale, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the cached value for `key` if present and still fresh
    ///
    /// An expired entry is removed as a side effect and reported as a miss.
    /// A value stored under a different type is also reported as a miss.
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let now = self.clock.now();
        let mut entries = self.lock();

        let expired = entries.get(key)?.is_expired(now);
        if expired {
            entries.remove(key);
            debug!(key, "cache entry expired");
            return None;
        }

        let value = entries.get(key)?.value.downcast_ref::<T>().cloned();
        if value.is_none() {
            debug!(key, "cache entry holds a different type");
        }
        value
    }

    /// Inserts or replaces the entry for `key`
    pub fn set<T>(&self, key: impl Into<String>, value: T, ttl: Duration)
    where
        T: Send + Sync + 'static,
    {
        let key = key.into();
        let entry = CacheEntry {
            value: Arc::new(value),
            stored_at: self.clock.now(),
            ttl,
        };
        debug!(key = %key, ttl_secs = ttl.as_secs(), "cache set");
        self.lock().insert(key, entry);
    }

    /// Removes every entry whose key starts with `prefix`
    ///
    /// Returns the number of removed entries.
    pub fn invalidate_resource(&self, prefix: &str) -> usize {
        let removed = self.remove_where(|key| key.starts_with(prefix));
        debug!(prefix, removed, "invalidated resource");
        removed
    }

    /// Removes every entry whose key contains `pattern` anywhere
    ///
    /// Returns the number of removed entries.
    pub fn invalidate_pattern(&self, pattern: &str) -> usize {
        let removed = self.remove_where(|key| key.contains(pattern));
        debug!(pattern, removed, "invalidated pattern");
        removed
    }

    /// Removes every entry
    pub fn clear(&self) {
        let mut entries = self.lock();
        debug!(removed = entries.len(), "cache cleared");
        entries.clear();
    }

    /// Applies the invalidation registered for `action`
    pub fn invalidate_for(&self, action: Action) {
        match action.invalidation() {
            Invalidation::Everything => self.clear(),
            Invalidation::Targeted {
                resources,
                patterns,
            } => {
                for resource in resources {
                    self.invalidate_resource(resource.prefix());
                }
                for pattern in patterns {
                    self.invalidate_pattern(pattern);
                }
            }
        }
    }

    fn remove_where(&self, matches: impl Fn(&str) -> bool) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| !matches(key));
        before - entries.len()
    }

    /// Serves `key` from the cache, or runs `fetch` and caches its result
    ///
    /// Only a successful fetch is stored, with the TTL of `tier`. A fetch error
    /// is returned unchanged and leaves the cache untouched.
    pub async fn read_through<T, E, F, Fut>(&self, key: &str, tier: TtlTier, fetch: F) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get::<T>(key) {
            debug!(key, "cache hit");
            return Ok(hit);
        }

        debug!(key, "cache miss");
        let value = fetch().await?;
        self.set(key, value.clone(), self.config.ttl(tier));
        Ok(value)
    }

    /// Number of stored entries, including stale ones not yet looked up
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns true if an entry is stored for `key`, fresh or not
    ///
    /// Unlike [`get`](Self::get) this never removes anything.
    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }
}
