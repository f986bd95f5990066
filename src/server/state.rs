//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::core::broker::RequestBroker;
use crate::core::health::HealthMonitor;
use crate::services::RoutingRuleService;
use crate::storage::BrokerStore;
use std::sync::Arc;

/// HTTP server state shared across handlers
///
/// Every field is reference counted so cloning the state per worker is
/// cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Loaded configuration (shared read-only)
    pub config: Arc<Config>,
    pub broker: Arc<RequestBroker>,
    pub rules: RoutingRuleService,
    pub store: Arc<dyn BrokerStore>,
    pub health: Arc<HealthMonitor>,
}

impl AppState {
    pub fn new(
        config: Config,
        broker: Arc<RequestBroker>,
        rules: RoutingRuleService,
        store: Arc<dyn BrokerStore>,
        health: Arc<HealthMonitor>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            broker,
            rules,
            store,
            health,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
