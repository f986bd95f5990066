//! Cache manager type definitions

use crate::core::types::{CacheEntry, ResponseData};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// A cache hit, as handed back to the broker
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    pub fingerprint: String,
    pub data: ResponseData,
    pub model_used: Option<String>,
    pub provider_used: Option<String>,
    /// Tokens of the call that produced the entry
    pub tokens_used: Option<u32>,
    pub cost: Option<f64>,
    pub cached_at: DateTime<Utc>,
    /// Hits including this one
    pub hit_count: u64,
}

impl From<CacheEntry> for CachedResponse {
    fn from(entry: CacheEntry) -> Self {
        Self {
            fingerprint: entry.fingerprint,
            data: entry.data,
            model_used: entry.model_used,
            provider_used: entry.provider_used,
            tokens_used: entry.tokens_used,
            cost: entry.cost,
            cached_at: entry.created_at,
            hit_count: entry.hit_count,
        }
    }
}

/// Atomic cache statistics for lock-free hot path updates
#[derive(Debug, Default)]
pub struct AtomicCacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub writes: AtomicU64,
    pub evictions: AtomicU64,
    /// Store calls that failed and were degraded to a miss or no-op
    pub store_errors: AtomicU64,
}

impl AtomicCacheStats {
    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
        }
    }

    pub(super) fn incr(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }
}

/// Cache statistics snapshot (returned to callers)
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub evictions: u64,
    pub store_errors: u64,
}

impl CacheStats {
    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
