//! Health monitor implementation
//!
//! Periodically probes every registered provider adapter, appends one health
//! record per provider to the store and invalidates the router snapshot so
//! the new records take effect.

use super::checker::{CheckOutcome, HealthCheckResult};
use crate::config::HealthConfig;
use crate::core::providers::{AiProvider, ProviderRegistry};
use crate::core::router::ModelRouter;
use crate::core::types::ProviderHealthRecord;
use crate::storage::BrokerStore;
use crate::utils::{Clock, SystemClock};
use futures::future::join_all;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Background provider health monitor
#[derive(Debug)]
pub struct HealthMonitor {
    registry: Arc<ProviderRegistry>,
    store: Arc<dyn BrokerStore>,
    router: Arc<ModelRouter>,
    clock: Arc<dyn Clock>,
    config: HealthConfig,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl HealthMonitor {
    /// Create a new health monitor
    pub fn new(
        registry: Arc<ProviderRegistry>,
        store: Arc<dyn BrokerStore>,
        router: Arc<ModelRouter>,
        config: HealthConfig,
    ) -> Self {
        Self {
            registry,
            store,
            router,
            clock: Arc::new(SystemClock),
            config,
            task: Mutex::new(None),
        }
    }

    /// Replace the time source used for record timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Start the periodic sweep; a second call while running is a no-op
    pub fn start(self: &Arc<Self>) {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            debug!("Health monitor already running");
            return;
        }

        let monitor = Arc::clone(self);
        let check_interval = self.config.check_interval();
        info!(
            "Starting health monitor (interval {}s)",
            check_interval.as_secs()
        );
        *task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(check_interval);
            loop {
                interval.tick().await;
                if monitor.registry.is_empty() {
                    debug!("No providers registered, skipping health sweep");
                    continue;
                }
                monitor.run_once().await;
            }
        }));
    }

    pub fn is_running(&self) -> bool {
        self.task.lock().as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Probe every registered provider once and persist the results
    pub async fn run_once(&self) -> Vec<ProviderHealthRecord> {
        let providers = self.registry.all();
        let records = join_all(providers.iter().map(|p| self.check_provider(p.as_ref()))).await;

        for record in &records {
            if let Err(e) = self.store.append_health_record(record).await {
                warn!(
                    "Failed to store health record for {}: {}",
                    record.provider_id, e
                );
            }
        }

        self.router.invalidate();
        debug!("Health sweep complete for {} providers", records.len());
        records
    }

    async fn check_provider(&self, provider: &dyn AiProvider) -> ProviderHealthRecord {
        let started = Instant::now();
        let outcome =
            match tokio::time::timeout(self.config.check_timeout(), provider.health_check()).await
            {
                Ok(check) => CheckOutcome::Completed(check),
                Err(_) => CheckOutcome::TimedOut(started.elapsed().as_millis() as u64),
            };
        let result = HealthCheckResult::classify(outcome, self.config.degraded_threshold_ms);

        match &result.error {
            Some(error) => warn!(
                provider = provider.id(),
                status = %result.status,
                "Provider health check: {}",
                error
            ),
            None => debug!(
                provider = provider.id(),
                response_time_ms = result.response_time_ms,
                "Provider healthy"
            ),
        }

        ProviderHealthRecord {
            provider_id: provider.id().to_string(),
            status: result.status,
            checked_at: self.clock.now(),
            response_time_ms: result.response_time_ms,
            error_rate: provider.error_rate(),
            rate_limit_remaining: Some(provider.rate_limit_status().remaining),
            error: result.error,
        }
    }

    /// Stop the periodic sweep
    pub async fn shutdown(&self) {
        info!("Shutting down health monitoring");
        let task = self.task.lock().take();
        if let Some(task) = task {
            task.abort();
            let _ = task.await;
        }
        info!("Health monitoring shutdown complete");
    }
}
