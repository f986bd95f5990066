//! Storage layer for the broker
//!
//! All persistent state the broker reads or writes goes through
//! [`BrokerStore`]: provider configuration, routing rules, the response
//! cache, the append-only health history and the request log.
//!
//! Two implementations exist. [`memory::MemoryStore`] keeps everything in
//! process and is used when no database is configured; [`database::Database`]
//! persists to SQLite or PostgreSQL through SeaORM.

/// Database storage module
pub mod database;
/// In-process storage module
pub mod memory;

use crate::config::{ProviderConfig, StorageConfig};
use crate::core::types::{
    CacheEntry, ProviderHealthRecord, RequestLogRecord, RoutingRule, RoutingRuleSpec,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

/// Persistence contract used by the router, cache, health monitor and broker.
///
/// Implementations must treat a missing table as empty data on reads and as a
/// no-op on writes.
#[async_trait]
pub trait BrokerStore: Send + Sync + std::fmt::Debug {
    /// All provider configurations, enabled or not
    async fn load_providers(&self) -> Result<Vec<ProviderConfig>>;

    /// Insert or replace a provider configuration by id
    async fn upsert_provider(&self, provider: &ProviderConfig) -> Result<()>;

    /// All routing rules, enabled or not
    async fn load_routing_rules(&self) -> Result<Vec<RoutingRule>>;

    /// Insert a rule, or update the rule with the same name in place
    async fn upsert_routing_rule(&self, spec: &RoutingRuleSpec) -> Result<RoutingRule>;

    /// Delete a rule by id; returns whether a rule was removed
    async fn delete_routing_rule(&self, id: &str) -> Result<bool>;

    async fn get_cache_entry(&self, fingerprint: &str) -> Result<Option<CacheEntry>>;

    /// Insert or overwrite the entry for its fingerprint
    async fn put_cache_entry(&self, entry: &CacheEntry) -> Result<()>;

    /// Bump the hit counter and last-accessed time of an entry
    async fn record_cache_hit(&self, fingerprint: &str, at: DateTime<Utc>) -> Result<()>;

    async fn delete_cache_entry(&self, fingerprint: &str) -> Result<()>;

    async fn count_cache_entries(&self) -> Result<usize>;

    /// Remove up to `count` entries, least recently accessed first, ties broken
    /// by creation time. Returns the number removed.
    async fn evict_cache_entries(&self, count: usize) -> Result<usize>;

    /// Remove every cache entry. Returns the number removed.
    async fn clear_cache(&self) -> Result<usize>;

    async fn append_health_record(&self, record: &ProviderHealthRecord) -> Result<()>;

    /// The most recent health record of each provider that has one
    async fn latest_health_records(&self) -> Result<Vec<ProviderHealthRecord>>;

    async fn insert_request_log(&self, record: &RequestLogRecord) -> Result<()>;

    /// Most recent request log rows, newest first
    async fn recent_request_logs(&self, limit: u64) -> Result<Vec<RequestLogRecord>>;
}

/// Open the configured store: the database when enabled, memory otherwise
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn BrokerStore>> {
    if config.database.enabled {
        info!("Initializing database storage");
        let database = database::Database::new(&config.database).await?;
        database.migrate().await?;
        Ok(Arc::new(database))
    } else {
        info!("Database disabled, using in-memory storage");
        Ok(Arc::new(memory::MemoryStore::with_retention(
            config.memory_retention,
        )))
    }
}
