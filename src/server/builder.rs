//! Server builder
//!
//! Wires storage, provider adapters, router, cache, broker and health
//! monitor together from a [`Config`].

use crate::config::Config;
use crate::core::broker::{BrokerObserver, RequestBroker, TracingObserver};
use crate::core::cache_manager::ResponseCache;
use crate::core::health::HealthMonitor;
use crate::core::providers::ProviderRegistry;
use crate::core::router::ModelRouter;
use crate::server::server::HttpServer;
use crate::server::state::AppState;
use crate::services::RoutingRuleService;
use crate::storage::{BrokerStore, open_store};
use crate::utils::error::{GatewayError, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Builder for the broker's application state and HTTP server
#[derive(Debug, Default)]
pub struct ServerBuilder {
    config: Option<Config>,
    store: Option<Arc<dyn BrokerStore>>,
    registry: Option<Arc<ProviderRegistry>>,
    observer: Option<Arc<dyn BrokerObserver>>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Use an existing store instead of opening the configured one
    pub fn with_store(mut self, store: Arc<dyn BrokerStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use pre-built adapters instead of building them from the provider configs
    pub fn with_registry(mut self, registry: Arc<ProviderRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn BrokerObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Build the shared state without starting anything
    pub async fn build_state(self) -> Result<AppState> {
        let config = self
            .config
            .ok_or_else(|| GatewayError::Config("Configuration is required".to_string()))?;

        let store = match self.store {
            Some(store) => store,
            None => open_store(&config.storage).await?,
        };
        seed_store(store.as_ref(), &config).await?;

        let registry = match self.registry {
            Some(registry) => registry,
            None => Arc::new(
                ProviderRegistry::from_configs(&config.providers)
                    .map_err(|e| GatewayError::Config(e.to_string()))?,
            ),
        };
        info!("{} provider adapter(s) registered", registry.len());

        let router = Arc::new(ModelRouter::new(store.clone(), &config.router));
        let cache = Arc::new(ResponseCache::new(store.clone(), config.cache.clone()));
        let observer = self
            .observer
            .unwrap_or_else(|| Arc::new(TracingObserver));
        let broker = RequestBroker::new(
            registry.clone(),
            router.clone(),
            cache,
            store.clone(),
            config.broker.clone(),
        )
        .with_observer(observer);
        let health = Arc::new(HealthMonitor::new(
            registry,
            store.clone(),
            router.clone(),
            config.health.clone(),
        ));
        let rules = RoutingRuleService::new(store.clone(), router);

        Ok(AppState::new(config, Arc::new(broker), rules, store, health))
    }

    /// Build the HTTP server
    pub async fn build(self) -> Result<HttpServer> {
        Ok(HttpServer::from_state(self.build_state().await?))
    }
}

/// Upsert configured providers and routing rules into the store
async fn seed_store(store: &dyn BrokerStore, config: &Config) -> Result<()> {
    for provider in &config.providers {
        store.upsert_provider(provider).await?;
        debug!("Seeded provider {}", provider.id);
    }
    for spec in &config.routing_rules {
        store.upsert_routing_rule(spec).await?;
        debug!("Seeded routing rule {}", spec.name);
    }
    info!(
        providers = config.providers.len(),
        rules = config.routing_rules.len(),
        "Store seeded from configuration"
    );
    Ok(())
}
