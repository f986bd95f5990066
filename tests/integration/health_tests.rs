//! Health monitor integration tests

use crate::common::fixtures::{self, provider_config};
use crate::common::{ScriptedProvider, TestDatabase};
use ai_request_broker::config::{HealthConfig, RouterConfig};
use ai_request_broker::core::health::HealthMonitor;
use ai_request_broker::core::providers::ProviderRegistry;
use ai_request_broker::core::router::ModelRouter;
use ai_request_broker::core::types::HealthStatus;
use ai_request_broker::storage::BrokerStore;
use std::sync::Arc;
use std::time::Duration;

struct Setup {
    primary: Arc<ScriptedProvider>,
    store: Arc<dyn BrokerStore>,
    router: Arc<ModelRouter>,
    monitor: Arc<HealthMonitor>,
    _db: TestDatabase,
}

async fn setup(config: HealthConfig) -> Setup {
    let db = TestDatabase::new().await;
    let store: Arc<dyn BrokerStore> = db.db_arc();

    let primary = ScriptedProvider::new("primary");
    let backup = ScriptedProvider::new("backup");
    store.upsert_provider(&provider_config("primary", 10)).await.unwrap();
    store.upsert_provider(&provider_config("backup", 5)).await.unwrap();

    let registry = ProviderRegistry::new();
    registry.register(primary.clone());
    registry.register(backup);

    let router = Arc::new(ModelRouter::new(store.clone(), &RouterConfig::default()));
    let monitor = Arc::new(HealthMonitor::new(
        Arc::new(registry),
        store.clone(),
        router.clone(),
        config,
    ));
    Setup {
        primary,
        store,
        router,
        monitor,
        _db: db,
    }
}

#[tokio::test]
async fn test_sweep_persists_records() {
    let s = setup(HealthConfig::default()).await;

    let records = s.monitor.run_once().await;
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.status == HealthStatus::Healthy));
    assert!(records.iter().all(|r| r.rate_limit_remaining == Some(60)));

    let stored = s.store.latest_health_records().await.unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn test_unhealthy_provider_is_routed_around() {
    let s = setup(HealthConfig::default()).await;
    let request = fixtures::generation("r1");
    assert_eq!(s.router.route(&request).await.unwrap().provider_id, "primary");

    s.primary.set_healthy(false);
    s.monitor.run_once().await;
    assert_eq!(s.router.route(&request).await.unwrap().provider_id, "backup");

    let latest = s.store.latest_health_records().await.unwrap();
    let primary = latest.iter().find(|r| r.provider_id == "primary").unwrap();
    assert_eq!(primary.status, HealthStatus::Unhealthy);
    assert_eq!(primary.error.as_deref(), Some("primary is down"));

    s.primary.set_healthy(true);
    s.monitor.run_once().await;
    assert_eq!(s.router.route(&request).await.unwrap().provider_id, "primary");
}

#[tokio::test]
async fn test_slow_probe_is_degraded_but_routable() {
    let s = setup(HealthConfig {
        degraded_threshold_ms: 1,
        ..Default::default()
    })
    .await;

    let records = s.monitor.run_once().await;
    assert!(records.iter().all(|r| r.status == HealthStatus::Degraded));
    assert_eq!(
        s.router.route(&fixtures::generation("r1")).await.unwrap().provider_id,
        "primary"
    );
}

#[tokio::test]
async fn test_background_sweeps() {
    let s = setup(HealthConfig {
        check_interval_secs: 1,
        ..Default::default()
    })
    .await;

    s.monitor.start();
    s.monitor.start();
    assert!(s.monitor.is_running());

    // The first tick fires immediately
    let mut stored = Vec::new();
    for _ in 0..50 {
        stored = s.store.latest_health_records().await.unwrap();
        if stored.len() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(stored.len(), 2);

    s.monitor.shutdown().await;
    assert!(!s.monitor.is_running());
}
