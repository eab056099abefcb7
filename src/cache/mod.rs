//! Time-boxed key/value cache persisted through a `DurableStore`.
//! All entries live in one JSON object under a fixed namespace key.
//! Keys are case-insensitive. TTL: 24 hours. Stale entries are ignored on
//! read, never deleted by it.

pub mod clock;
pub mod sqlite_store;
pub mod store;

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use clock::{Clock, SystemClock};
use store::DurableStore;

/// Storage key under which the whole entry map is persisted.
pub const DEFAULT_NAMESPACE: &str = "labelogic_product_images";

/// Default freshness window: 24 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 3600);

/// A cached value and the time it was written (Unix ms).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub value: String,
    pub written_at: i64,
}

type EntryMap = BTreeMap<String, CacheEntry>;

pub struct TimeBoxedCache<S, C = SystemClock> {
    store: S,
    clock: C,
    namespace: String,
    ttl: Duration,
}

impl<S: DurableStore> TimeBoxedCache<S, SystemClock> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: DurableStore, C: Clock> TimeBoxedCache<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            namespace: DEFAULT_NAMESPACE.to_string(),
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Look up a fresh value. Returns None if absent, expired, or unreadable.
    pub fn get(&self, key: &str) -> Option<String> {
        let key = key.to_lowercase();
        let entries = self.load();
        let entry = entries.get(&key)?;
        if self.is_fresh(entry) {
            Some(entry.value.clone())
        } else {
            debug!(key = %key, "cache entry expired");
            None
        }
    }

    /// Insert or overwrite a value. Storage failures are logged, never returned.
    pub fn set(&self, key: &str, value: &str) {
        let mut entries = self.load();
        entries.insert(
            key.to_lowercase(),
            CacheEntry {
                value: value.to_string(),
                written_at: self.clock.now_ms(),
            },
        );
        self.persist(&entries);
    }

    /// Drop the whole namespace from the store.
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(&self.namespace) {
            warn!(error = %e, namespace = %self.namespace, "cache clear failed");
        }
    }

    /// Read-through lookup: return the cached value or resolve, cache and
    /// return it.
    pub fn get_or_resolve<F>(&self, key: &str, resolve: F) -> String
    where
        F: FnOnce(&str) -> String,
    {
        if let Some(cached) = self.get(key) {
            return cached;
        }
        let value = resolve(key);
        self.set(key, &value);
        value
    }

    /// Like `get_or_resolve`, for resolvers that can fail. Failures are not cached.
    pub fn get_or_try_resolve<F, E>(&self, key: &str, resolve: F) -> Result<String, E>
    where
        F: FnOnce(&str) -> Result<String, E>,
    {
        if let Some(cached) = self.get(key) {
            return Ok(cached);
        }
        let value = resolve(key)?;
        self.set(key, &value);
        Ok(value)
    }

    /// Rewrite the namespace without stale entries. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.load();
        let before = entries.len();
        entries.retain(|_, entry| self.is_fresh(entry));
        let removed = before - entries.len();
        if removed > 0 {
            self.persist(&entries);
            debug!(removed, namespace = %self.namespace, "cache purge");
        }
        removed
    }

    /// Number of stored entries, fresh or stale.
    pub fn len(&self) -> usize {
        self.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        // An age that overflows i64 comes from a corrupt timestamp: stale.
        match self.clock.now_ms().checked_sub(entry.written_at) {
            Some(age_ms) => age_ms < clock::duration_ms(self.ttl),
            None => false,
        }
    }

    fn load(&self) -> EntryMap {
        let Some(blob) = self.store.read(&self.namespace) else {
            return EntryMap::new();
        };
        serde_json::from_str(&blob).unwrap_or_else(|e| {
            warn!(error = %e, namespace = %self.namespace, "cache blob unreadable, treating as empty");
            EntryMap::new()
        })
    }

    fn persist(&self, entries: &EntryMap) {
        let blob = match serde_json::to_string(entries) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(error = %e, "cache serialize failed");
                return;
            }
        };
        if let Err(e) = self.store.write(&self.namespace, &blob) {
            warn!(error = %e, namespace = %self.namespace, "cache write failed");
        }
    }
}
