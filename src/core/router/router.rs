//! Model router core structure
//!
//! The router works off a snapshot of providers, rules and latest health
//! records loaded from the store. The snapshot is swapped wholesale and is
//! reloaded once it is older than the refresh interval.

use super::error::RouterError;
use super::rules::{self, RequestFeatures};
use super::selection::{select_model, sort_providers};
use crate::config::{ProviderConfig, RouterConfig};
use crate::core::types::{
    BrokerRequest, HealthStatus, ProviderHealthRecord, RouteDecision, RoutingRule,
};
use crate::storage::BrokerStore;
use crate::utils::{Clock, SystemClock};
use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Point-in-time view of everything routing depends on
#[derive(Debug, Clone)]
pub struct RouterSnapshot {
    /// All providers, sorted by priority desc
    pub providers: Vec<ProviderConfig>,
    /// All rules, in evaluation order
    pub rules: Vec<RoutingRule>,
    /// Latest health record per provider id
    pub health: HashMap<String, ProviderHealthRecord>,
    pub loaded_at: DateTime<Utc>,
}

impl RouterSnapshot {
    pub fn provider(&self, id: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.id == id)
    }

    pub fn health_status(&self, id: &str) -> Option<HealthStatus> {
        self.health.get(id).map(|r| r.status)
    }

    /// Enabled and not known to be unhealthy; no record counts as available
    pub fn is_available(&self, provider: &ProviderConfig) -> bool {
        provider.enabled
            && self
                .health_status(&provider.id)
                .is_none_or(|s| s.is_available())
    }

    /// Available providers in priority order
    pub fn available_providers(&self) -> Vec<AvailableProvider> {
        self.providers
            .iter()
            .filter(|p| self.is_available(p))
            .map(|p| AvailableProvider {
                config: p.clone(),
                health: self.health_status(&p.id),
            })
            .collect()
    }
}

/// A routable provider with its latest known health
#[derive(Debug, Clone, PartialEq)]
pub struct AvailableProvider {
    pub config: ProviderConfig,
    pub health: Option<HealthStatus>,
}

/// Chooses a provider and model for every request
#[derive(Debug)]
pub struct ModelRouter {
    store: Arc<dyn BrokerStore>,
    clock: Arc<dyn Clock>,
    refresh_interval: chrono::Duration,
    snapshot: ArcSwapOption<RouterSnapshot>,
    refresh_lock: tokio::sync::Mutex<()>,
}

impl ModelRouter {
    /// Create a router over the given store
    pub fn new(store: Arc<dyn BrokerStore>, config: &RouterConfig) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            refresh_interval: chrono::Duration::seconds(config.refresh_interval_secs as i64),
            snapshot: ArcSwapOption::empty(),
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Drop the snapshot so the next call reloads from the store
    pub fn invalidate(&self) {
        debug!("Router snapshot invalidated");
        self.snapshot.store(None);
    }

    /// Reload the snapshot now
    pub async fn refresh(&self) -> Arc<RouterSnapshot> {
        let _guard = self.refresh_lock.lock().await;
        self.load_snapshot().await
    }

    /// Current snapshot, reloaded when missing or stale
    pub async fn snapshot(&self) -> Arc<RouterSnapshot> {
        if let Some(snapshot) = self.fresh_snapshot() {
            return snapshot;
        }
        let _guard = self.refresh_lock.lock().await;
        // Another task may have refreshed while we waited
        if let Some(snapshot) = self.fresh_snapshot() {
            return snapshot;
        }
        self.load_snapshot().await
    }

    fn fresh_snapshot(&self) -> Option<Arc<RouterSnapshot>> {
        let snapshot = self.snapshot.load_full()?;
        let age = self.clock.now() - snapshot.loaded_at;
        (age < self.refresh_interval).then_some(snapshot)
    }

    async fn load_snapshot(&self) -> Arc<RouterSnapshot> {
        let previous = self.snapshot.load_full();

        let mut providers = match self.store.load_providers().await {
            Ok(providers) => providers,
            Err(e) => {
                warn!("Failed to load providers, keeping previous view: {}", e);
                previous
                    .as_ref()
                    .map(|s| s.providers.clone())
                    .unwrap_or_default()
            }
        };
        sort_providers(&mut providers);

        let mut rules = match self.store.load_routing_rules().await {
            Ok(rules) => rules,
            Err(e) => {
                warn!("Failed to load routing rules, keeping previous view: {}", e);
                previous.as_ref().map(|s| s.rules.clone()).unwrap_or_default()
            }
        };
        rules::sort_rules(&mut rules);

        let health = match self.store.latest_health_records().await {
            Ok(records) => records
                .into_iter()
                .map(|r| (r.provider_id.clone(), r))
                .collect(),
            Err(e) => {
                warn!("Failed to load provider health, keeping previous view: {}", e);
                previous.as_ref().map(|s| s.health.clone()).unwrap_or_default()
            }
        };

        let snapshot = Arc::new(RouterSnapshot {
            providers,
            rules,
            health,
            loaded_at: self.clock.now(),
        });
        info!(
            providers = snapshot.providers.len(),
            rules = snapshot.rules.len(),
            health_records = snapshot.health.len(),
            "Router snapshot refreshed"
        );
        self.snapshot.store(Some(Arc::clone(&snapshot)));
        snapshot
    }

    /// Decide provider and model for a request
    pub async fn route(&self, request: &BrokerRequest) -> Result<RouteDecision, RouterError> {
        let snapshot = self.snapshot().await;
        let features = RequestFeatures::from_request(request);

        for rule in snapshot.rules.iter().filter(|r| r.enabled) {
            if !rules::matches(&rule.conditions, &features) {
                continue;
            }
            match snapshot.provider(&rule.target.provider_id) {
                Some(provider) if provider.enabled => {
                    let model = if rule.target.model.is_empty() {
                        select_model(provider, request, features.complexity)
                    } else {
                        rule.target.model.clone()
                    };
                    debug!(
                        rule = %rule.name,
                        provider = %provider.id,
                        model = %model,
                        "Request matched routing rule"
                    );
                    return Ok(RouteDecision {
                        provider_id: provider.id.clone(),
                        model,
                        reasoning: format!("Matched routing rule '{}'", rule.name),
                        rule_id: Some(rule.id.clone()),
                    });
                }
                _ => debug!(
                    "Skipping rule '{}': provider {} is disabled or unknown",
                    rule.name, rule.target.provider_id
                ),
            }
        }

        let available = snapshot.available_providers();
        let chosen = available.first().ok_or_else(|| {
            RouterError::NoProvidersAvailable(
                "no enabled provider is currently healthy".to_string(),
            )
        })?;
        let model = select_model(&chosen.config, request, features.complexity);
        Ok(RouteDecision {
            provider_id: chosen.config.id.clone(),
            reasoning: format!(
                "Highest priority available provider '{}' (priority {}) for {} request of {} complexity",
                chosen.config.id,
                chosen.config.priority,
                features.kind,
                features.complexity
            ),
            model,
            rule_id: None,
        })
    }

    /// Enabled, not-unhealthy providers in priority order
    pub async fn available_providers(&self) -> Vec<AvailableProvider> {
        self.snapshot().await.available_providers()
    }

    /// Providers to try after `failed` has failed.
    ///
    /// Excludes everything in `tried`, puts the failed provider's designated
    /// fallback first when it is available, and returns at most `max`.
    pub async fn fallback_candidates(
        &self,
        failed: &str,
        tried: &HashSet<String>,
        max: usize,
    ) -> Vec<ProviderConfig> {
        let snapshot = self.snapshot().await;
        let mut candidates: Vec<ProviderConfig> = snapshot
            .available_providers()
            .into_iter()
            .map(|p| p.config)
            .filter(|p| !tried.contains(&p.id))
            .collect();

        let designated = snapshot
            .provider(failed)
            .and_then(|p| p.fallback_provider.as_deref());
        if let Some(designated) = designated {
            if let Some(pos) = candidates.iter().position(|p| p.id == designated) {
                let preferred = candidates.remove(pos);
                candidates.insert(0, preferred);
            }
        }

        candidates.truncate(max);
        candidates
    }

    /// Model a given provider should use for a request
    pub fn model_for(&self, provider: &ProviderConfig, request: &BrokerRequest) -> String {
        let complexity = super::complexity::assess_complexity(request);
        select_model(provider, request, complexity)
    }
}
