//! Response cache implementation
//!
//! Store-backed cache of successful broker responses keyed by request
//! fingerprint. Every store failure is logged and degraded: a failed read is
//! a miss, a failed write is a no-op.

use super::fingerprint::fingerprint;
use super::policy::{is_cacheable, ttl_secs};
use super::types::{AtomicCacheStats, CacheStats, CachedResponse};
use crate::config::CacheConfig;
use crate::core::types::{BrokerRequest, BrokerResponse, CacheEntry};
use crate::storage::BrokerStore;
use crate::utils::{Clock, SystemClock};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fingerprint-keyed cache of broker responses
#[derive(Debug)]
pub struct ResponseCache {
    store: Arc<dyn BrokerStore>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
    stats: AtomicCacheStats,
}

impl ResponseCache {
    /// Create a new response cache
    pub fn new(store: Arc<dyn BrokerStore>, config: CacheConfig) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            config,
            stats: AtomicCacheStats::default(),
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn is_cacheable(&self, request: &BrokerRequest) -> bool {
        is_cacheable(request)
    }

    pub fn fingerprint(&self, request: &BrokerRequest) -> String {
        fingerprint(request)
    }

    /// Look up a cached response; bumps hit count and last-accessed on a hit
    pub async fn get(&self, request: &BrokerRequest) -> Option<CachedResponse> {
        if !is_cacheable(request) {
            return None;
        }
        let key = fingerprint(request);
        let now = self.clock.now();

        let entry = match self.store.get_cache_entry(&key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                AtomicCacheStats::incr(&self.stats.misses, 1);
                return None;
            }
            Err(e) => {
                warn!("Cache read failed for {}: {}", key, e);
                AtomicCacheStats::incr(&self.stats.store_errors, 1);
                AtomicCacheStats::incr(&self.stats.misses, 1);
                return None;
            }
        };

        if entry.is_expired(now) {
            debug!("Cache entry {} expired at {}", key, entry.expires_at);
            if let Err(e) = self.store.delete_cache_entry(&key).await {
                warn!("Failed to delete expired cache entry {}: {}", key, e);
                AtomicCacheStats::incr(&self.stats.store_errors, 1);
            }
            AtomicCacheStats::incr(&self.stats.misses, 1);
            return None;
        }

        if let Err(e) = self.store.record_cache_hit(&key, now).await {
            warn!("Failed to record cache hit for {}: {}", key, e);
            AtomicCacheStats::incr(&self.stats.store_errors, 1);
        }
        AtomicCacheStats::incr(&self.stats.hits, 1);

        let mut hit = CachedResponse::from(entry);
        hit.hit_count += 1;
        debug!("Cache hit for {} (hit #{})", key, hit.hit_count);
        Some(hit)
    }

    /// Store a successful response; a later `set` for the same fingerprint overwrites
    pub async fn set(&self, request: &BrokerRequest, response: &BrokerResponse) {
        if !response.success || !is_cacheable(request) {
            return;
        }
        let Some(data) = response.data.clone() else {
            return;
        };

        let now = self.clock.now();
        let ttl = ttl_secs(request, self.config.default_ttl_secs);
        let Some(expires_at) = i64::try_from(ttl)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
        else {
            warn!("Cache TTL of {}s is out of range, not caching", ttl);
            return;
        };

        self.ensure_capacity().await;

        let entry = CacheEntry {
            fingerprint: fingerprint(request),
            data,
            model_used: response.metadata.model_used.clone(),
            provider_used: response.metadata.provider_used.clone(),
            tokens_used: response.metadata.tokens_used,
            cost: response.metadata.cost,
            created_at: now,
            expires_at,
            hit_count: 0,
            last_accessed: now,
        };

        match self.store.put_cache_entry(&entry).await {
            Ok(()) => {
                AtomicCacheStats::incr(&self.stats.writes, 1);
                debug!("Cached response {} for {}s", entry.fingerprint, ttl);
            }
            Err(e) => {
                warn!("Cache write failed for {}: {}", entry.fingerprint, e);
                AtomicCacheStats::incr(&self.stats.store_errors, 1);
            }
        }
    }

    /// Evict a tenth of capacity (at least one entry) when full
    async fn ensure_capacity(&self) {
        let max_size = self.config.max_size;
        let count = match self.store.count_cache_entries().await {
            Ok(count) => count,
            Err(e) => {
                warn!("Failed to count cache entries: {}", e);
                AtomicCacheStats::incr(&self.stats.store_errors, 1);
                return;
            }
        };
        if count < max_size {
            return;
        }

        let to_evict = max_size.div_ceil(10).max(1);
        match self.store.evict_cache_entries(to_evict).await {
            Ok(evicted) => {
                AtomicCacheStats::incr(&self.stats.evictions, evicted as u64);
                debug!("Evicted {} cache entries ({} / {})", evicted, count, max_size);
            }
            Err(e) => {
                warn!("Cache eviction failed: {}", e);
                AtomicCacheStats::incr(&self.stats.store_errors, 1);
            }
        }
    }

    /// Remove every entry; returns the number removed
    pub async fn clear(&self) -> usize {
        match self.store.clear_cache().await {
            Ok(removed) => {
                info!("Cleared {} cache entries", removed);
                removed
            }
            Err(e) => {
                warn!("Failed to clear cache: {}", e);
                AtomicCacheStats::incr(&self.stats.store_errors, 1);
                0
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }
}
