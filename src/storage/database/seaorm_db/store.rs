//! [`BrokerStore`] backed by SeaORM

use super::tolerate_missing_table;
use super::types::SeaOrmDatabase;
use crate::config::ProviderConfig;
use crate::core::types::{
    CacheEntry, ProviderHealthRecord, RequestLogRecord, RoutingRule, RoutingRuleSpec,
};
use crate::storage::BrokerStore;
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
impl BrokerStore for SeaOrmDatabase {
    async fn load_providers(&self) -> Result<Vec<ProviderConfig>> {
        tolerate_missing_table(self.list_providers().await, "broker_providers")
    }

    async fn upsert_provider(&self, provider: &ProviderConfig) -> Result<()> {
        tolerate_missing_table(self.save_provider(provider).await, "broker_providers")
    }

    async fn load_routing_rules(&self) -> Result<Vec<RoutingRule>> {
        tolerate_missing_table(self.list_routing_rules().await, "broker_routing_rules")
    }

    async fn upsert_routing_rule(&self, spec: &RoutingRuleSpec) -> Result<RoutingRule> {
        // A rule cannot be returned without a table to hold it
        self.save_routing_rule(spec).await.map_err(|e| {
            if e.is_missing_table() {
                GatewayError::storage("routing rules table does not exist; run migrations")
            } else {
                e
            }
        })
    }

    async fn delete_routing_rule(&self, id: &str) -> Result<bool> {
        tolerate_missing_table(self.remove_routing_rule(id).await, "broker_routing_rules")
    }

    async fn get_cache_entry(&self, fingerprint: &str) -> Result<Option<CacheEntry>> {
        tolerate_missing_table(
            self.find_cache_entry(fingerprint).await,
            "broker_response_cache",
        )
    }

    async fn put_cache_entry(&self, entry: &CacheEntry) -> Result<()> {
        tolerate_missing_table(self.save_cache_entry(entry).await, "broker_response_cache")
    }

    async fn record_cache_hit(&self, fingerprint: &str, at: DateTime<Utc>) -> Result<()> {
        tolerate_missing_table(
            self.touch_cache_entry(fingerprint, at).await,
            "broker_response_cache",
        )
    }

    async fn delete_cache_entry(&self, fingerprint: &str) -> Result<()> {
        tolerate_missing_table(
            self.remove_cache_entry(fingerprint).await,
            "broker_response_cache",
        )
    }

    async fn count_cache_entries(&self) -> Result<usize> {
        tolerate_missing_table(self.cache_entry_count().await, "broker_response_cache")
    }

    async fn evict_cache_entries(&self, count: usize) -> Result<usize> {
        tolerate_missing_table(
            self.evict_least_recently_used(count).await,
            "broker_response_cache",
        )
    }

    async fn clear_cache(&self) -> Result<usize> {
        tolerate_missing_table(
            self.remove_all_cache_entries().await,
            "broker_response_cache",
        )
    }

    async fn append_health_record(&self, record: &ProviderHealthRecord) -> Result<()> {
        tolerate_missing_table(
            self.save_health_record(record).await,
            "broker_provider_health",
        )
    }

    async fn latest_health_records(&self) -> Result<Vec<ProviderHealthRecord>> {
        tolerate_missing_table(
            self.latest_health_by_provider().await,
            "broker_provider_health",
        )
    }

    async fn insert_request_log(&self, record: &RequestLogRecord) -> Result<()> {
        tolerate_missing_table(self.save_request_log(record).await, "broker_request_logs")
    }

    async fn recent_request_logs(&self, limit: u64) -> Result<Vec<RequestLogRecord>> {
        tolerate_missing_table(self.list_request_logs(limit).await, "broker_request_logs")
    }
}
