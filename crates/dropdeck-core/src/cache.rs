//! Bundle cache
//!
//! Concurrent map from `(representation, screen, language)` to a frozen
//! bundle. Entries expire after a TTL; expired entries are dropped lazily on
//! lookup or by [`BundleCache::purge_expired`].

use crate::bundle::DropdownBundle;
use crate::config::SourceRepresentation;
use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Representation that produced the entry
    pub representation: SourceRepresentation,
    /// Screen location
    pub screen_location: String,
    /// Language code
    pub language_code: String,
}

impl CacheKey {
    /// Build a key
    #[must_use]
    pub fn new(representation: SourceRepresentation, screen_location: &str, language_code: &str) -> Self {
        Self {
            representation,
            screen_location: screen_location.to_string(),
            language_code: language_code.to_string(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dropdowns_{}_{}_{}",
            self.representation, self.screen_location, self.language_code
        )
    }
}

struct CacheEntry {
    bundle: Arc<DropdownBundle>,
    stored_at: Instant,
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Live entries
    pub keys_count: usize,
    /// Lookups served from the cache
    pub hits: u64,
    /// Lookups that missed
    pub misses: u64,
    /// Entries dropped because they outlived the TTL
    pub expired: u64,
    /// TTL in seconds (`None` when entries never expire)
    pub ttl_secs: Option<u64>,
}

impl CacheStats {
    /// Hits as a percentage of lookups
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64 * 100.0
        }
    }
}

/// TTL cache of resolved bundles
pub struct BundleCache {
    entries: DashMap<CacheKey, CacheEntry>,
    ttl: Option<Duration>,
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
}

impl BundleCache {
    /// Create a cache; `None` keeps entries until invalidated
    #[must_use]
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: ttl.filter(|d| !d.is_zero()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expired: AtomicU64::new(0),
        }
    }

    /// Configured TTL
    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        self.ttl
            .is_some_and(|ttl| entry.stored_at.elapsed() >= ttl)
    }

    /// Look a bundle up, counting the hit or miss
    pub fn get(&self, key: &CacheKey) -> Option<Arc<DropdownBundle>> {
        let found = self.entries.get(key).and_then(|entry| {
            if self.is_expired(&entry) {
                None
            } else {
                Some(Arc::clone(&entry.bundle))
            }
        });

        match found {
            Some(bundle) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(bundle)
            }
            None => {
                if self
                    .entries
                    .remove_if(key, |_, entry| self.is_expired(entry))
                    .is_some()
                {
                    self.expired.fetch_add(1, Ordering::Relaxed);
                }
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a bundle, replacing any previous entry
    pub fn insert(&self, key: CacheKey, bundle: Arc<DropdownBundle>) {
        self.entries.insert(
            key,
            CacheEntry {
                bundle,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop entries of one screen, optionally only one language.
    /// Returns how many entries were removed.
    pub fn invalidate(&self, screen_location: &str, language_code: Option<&str>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| {
            key.screen_location != screen_location
                || language_code.is_some_and(|lang| key.language_code != lang)
        });
        before.saturating_sub(self.entries.len())
    }

    /// Drop every entry; returns how many were removed
    pub fn clear(&self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    /// Drop entries that outlived the TTL; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !self.is_expired(entry));
        let removed = before.saturating_sub(self.entries.len());
        self.expired.fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    /// Number of stored entries (expired ones included until purged)
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored keys in their display form, sorted
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().to_string()).collect();
        keys.sort();
        keys
    }

    /// Counter snapshot
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            keys_count: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            ttl_secs: self.ttl.map(|d| d.as_secs()),
        }
    }
}
