//! In-process store

use super::BrokerStore;
use crate::config::{ProviderConfig, default_memory_retention};
use crate::core::types::{
    CacheEntry, ProviderHealthRecord, RequestLogRecord, RoutingRule, RoutingRuleSpec,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};

/// Store that keeps all state in memory.
///
/// Request logs and health records are capped at `retention` rows, oldest
/// first; the newest health record of each provider is never dropped.
#[derive(Debug)]
pub struct MemoryStore {
    providers: RwLock<Vec<ProviderConfig>>,
    rules: RwLock<Vec<RoutingRule>>,
    cache: DashMap<String, CacheEntry>,
    health: RwLock<VecDeque<ProviderHealthRecord>>,
    logs: RwLock<VecDeque<RequestLogRecord>>,
    retention: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_retention(default_memory_retention())
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(retention: usize) -> Self {
        Self {
            providers: RwLock::default(),
            rules: RwLock::default(),
            cache: DashMap::new(),
            health: RwLock::default(),
            logs: RwLock::default(),
            retention,
        }
    }

    /// Insert a fully-formed rule, keeping its id and creation time
    pub fn insert_rule(&self, rule: RoutingRule) {
        let mut rules = self.rules.write();
        rules.retain(|r| r.name != rule.name);
        rules.push(rule);
    }

    /// Retained health records, oldest first
    pub fn health_history(&self) -> Vec<ProviderHealthRecord> {
        self.health.read().iter().cloned().collect()
    }

    /// Retained request log rows, oldest first
    pub fn request_logs(&self) -> Vec<RequestLogRecord> {
        self.logs.read().iter().cloned().collect()
    }
}

#[async_trait]
impl BrokerStore for MemoryStore {
    async fn load_providers(&self) -> Result<Vec<ProviderConfig>> {
        Ok(self.providers.read().clone())
    }

    async fn upsert_provider(&self, provider: &ProviderConfig) -> Result<()> {
        let mut providers = self.providers.write();
        match providers.iter_mut().find(|p| p.id == provider.id) {
            Some(existing) => *existing = provider.clone(),
            None => providers.push(provider.clone()),
        }
        Ok(())
    }

    async fn load_routing_rules(&self) -> Result<Vec<RoutingRule>> {
        Ok(self.rules.read().clone())
    }

    async fn upsert_routing_rule(&self, spec: &RoutingRuleSpec) -> Result<RoutingRule> {
        let mut rules = self.rules.write();
        if let Some(existing) = rules.iter_mut().find(|r| r.name == spec.name) {
            existing.priority = spec.priority;
            existing.enabled = spec.enabled;
            existing.conditions = spec.conditions.clone();
            existing.target = spec.target.clone();
            return Ok(existing.clone());
        }

        let rule = RoutingRule {
            id: crate::utils::generate_id(),
            name: spec.name.clone(),
            priority: spec.priority,
            enabled: spec.enabled,
            conditions: spec.conditions.clone(),
            target: spec.target.clone(),
            created_at: Utc::now(),
        };
        rules.push(rule.clone());
        Ok(rule)
    }

    async fn delete_routing_rule(&self, id: &str) -> Result<bool> {
        let mut rules = self.rules.write();
        let before = rules.len();
        rules.retain(|r| r.id != id);
        Ok(rules.len() != before)
    }

    async fn get_cache_entry(&self, fingerprint: &str) -> Result<Option<CacheEntry>> {
        Ok(self.cache.get(fingerprint).map(|e| e.value().clone()))
    }

    async fn put_cache_entry(&self, entry: &CacheEntry) -> Result<()> {
        self.cache.insert(entry.fingerprint.clone(), entry.clone());
        Ok(())
    }

    async fn record_cache_hit(&self, fingerprint: &str, at: DateTime<Utc>) -> Result<()> {
        if let Some(mut entry) = self.cache.get_mut(fingerprint) {
            entry.hit_count += 1;
            entry.last_accessed = at;
        }
        Ok(())
    }

    async fn delete_cache_entry(&self, fingerprint: &str) -> Result<()> {
        self.cache.remove(fingerprint);
        Ok(())
    }

    async fn count_cache_entries(&self) -> Result<usize> {
        Ok(self.cache.len())
    }

    async fn evict_cache_entries(&self, count: usize) -> Result<usize> {
        let mut candidates: Vec<(DateTime<Utc>, DateTime<Utc>, String)> = self
            .cache
            .iter()
            .map(|e| (e.last_accessed, e.created_at, e.key().clone()))
            .collect();
        candidates.sort();

        let mut removed = 0;
        for (_, _, fingerprint) in candidates.into_iter().take(count) {
            if self.cache.remove(&fingerprint).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn clear_cache(&self) -> Result<usize> {
        let count = self.cache.len();
        self.cache.clear();
        Ok(count)
    }

    async fn append_health_record(&self, record: &ProviderHealthRecord) -> Result<()> {
        let mut health = self.health.write();
        health.push_back(record.clone());
        while health.len() > self.retention {
            match oldest_superseded(&health) {
                Some(index) => {
                    health.remove(index);
                }
                None => break,
            }
        }
        Ok(())
    }

    async fn latest_health_records(&self) -> Result<Vec<ProviderHealthRecord>> {
        let mut latest: HashMap<String, ProviderHealthRecord> = HashMap::new();
        for record in self.health.read().iter() {
            match latest.get(&record.provider_id) {
                Some(current) if current.checked_at > record.checked_at => {}
                _ => {
                    latest.insert(record.provider_id.clone(), record.clone());
                }
            }
        }
        let mut records: Vec<_> = latest.into_values().collect();
        records.sort_by(|a, b| a.provider_id.cmp(&b.provider_id));
        Ok(records)
    }

    async fn insert_request_log(&self, record: &RequestLogRecord) -> Result<()> {
        let mut logs = self.logs.write();
        logs.push_back(record.clone());
        while logs.len() > self.retention {
            logs.pop_front();
        }
        Ok(())
    }

    async fn recent_request_logs(&self, limit: u64) -> Result<Vec<RequestLogRecord>> {
        Ok(self
            .logs
            .read()
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

/// Position of the oldest record that is not its provider's latest
fn oldest_superseded(records: &VecDeque<ProviderHealthRecord>) -> Option<usize> {
    let mut latest: HashMap<&str, usize> = HashMap::new();
    for (index, record) in records.iter().enumerate() {
        match latest.get(record.provider_id.as_str()) {
            Some(&current) if records[current].checked_at > record.checked_at => {}
            _ => {
                latest.insert(record.provider_id.as_str(), index);
            }
        }
    }
    (0..records.len())
        .find(|index| latest.get(records[*index].provider_id.as_str()) != Some(index))
}
