//! SeaORM store integration tests

use crate::assert_ok;
use crate::common::TestDatabase;
use crate::common::fixtures::{provider_config, rule_spec};
use ai_request_broker::core::types::{
    CacheEntry, ErrorCode, HealthStatus, ProviderAttempt, ProviderHealthRecord, RequestKind,
    RequestLogRecord, RequestPriority, ResponseData,
};
use ai_request_broker::storage::BrokerStore;
use ai_request_broker::storage::database::DatabaseBackendType;
use chrono::{Duration, Utc};

fn health(provider_id: &str, status: HealthStatus, minutes_ago: i64) -> ProviderHealthRecord {
    ProviderHealthRecord {
        provider_id: provider_id.to_string(),
        status,
        checked_at: Utc::now() - Duration::minutes(minutes_ago),
        response_time_ms: 250,
        error_rate: 0.1,
        rate_limit_remaining: Some(40),
        error: None,
    }
}

fn log_record(request_id: &str, success: bool) -> RequestLogRecord {
    RequestLogRecord {
        id: format!("log-{}", request_id),
        request_id: request_id.to_string(),
        user_id: "user-1".to_string(),
        conversation_id: None,
        kind: Some(RequestKind::Generation),
        priority: RequestPriority::Normal,
        provider_id: Some("primary".to_string()),
        model: Some("model-a".to_string()),
        tokens_used: success.then_some(42),
        cost: success.then_some(0.001),
        processing_time_ms: 120,
        cached: false,
        streaming: false,
        success,
        error_code: (!success).then_some(ErrorCode::ProviderError),
        error_message: (!success).then(|| "boom".to_string()),
        attempts: vec![ProviderAttempt {
            provider_id: "primary".to_string(),
            model: "model-a".to_string(),
            response_time_ms: 100,
            success,
            error: None,
        }],
        created_at: Utc::now(),
    }
}

fn cache_entry(fingerprint: &str, accessed_minutes_ago: i64) -> CacheEntry {
    let now = Utc::now();
    CacheEntry {
        fingerprint: fingerprint.to_string(),
        data: ResponseData::Analysis {
            analysis: "readable".to_string(),
        },
        model_used: Some("model-a".to_string()),
        provider_used: Some("primary".to_string()),
        tokens_used: Some(12),
        cost: Some(0.0002),
        created_at: now - Duration::minutes(accessed_minutes_ago),
        expires_at: now + Duration::hours(1),
        hit_count: 0,
        last_accessed: now - Duration::minutes(accessed_minutes_ago),
    }
}

#[tokio::test]
async fn test_database_setup() {
    let db = TestDatabase::new().await;
    assert_eq!(db.db().backend_type(), DatabaseBackendType::SQLite);
    db.db().health_check().await.unwrap();
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let db = TestDatabase::new().await;
    db.db().migrate().await.unwrap();
}

#[tokio::test]
async fn test_provider_round_trip() {
    let db = TestDatabase::new().await;
    let store = db.db();

    let mut config = provider_config("primary", 10);
    config.api_key = "sk-secret".to_string();
    config.fallback_provider = Some("backup".to_string());
    store.upsert_provider(&config).await.unwrap();

    config.priority = 20;
    store.upsert_provider(&config).await.unwrap();

    let providers = store.load_providers().await.unwrap();
    assert_eq!(providers.len(), 1);
    let loaded = &providers[0];
    assert_eq!(loaded.priority, 20);
    assert_eq!(loaded.models, config.models);
    assert_eq!(loaded.fast_model.as_deref(), Some("model-fast"));
    assert_eq!(loaded.fallback_provider.as_deref(), Some("backup"));
    // Credentials stay in configuration
    assert!(loaded.api_key.is_empty());
}

#[tokio::test]
async fn test_routing_rule_lifecycle() {
    let db = TestDatabase::new().await;
    let store = db.db();

    let created = store
        .upsert_routing_rule(&rule_spec("chat", 1, RequestKind::Chat, "tutor"))
        .await
        .unwrap();
    let updated = store
        .upsert_routing_rule(&rule_spec("chat", 7, RequestKind::Chat, "other"))
        .await
        .unwrap();
    assert_eq!(created.id, updated.id);

    let rules = store.load_routing_rules().await.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].priority, 7);
    assert_eq!(rules[0].target.provider_id, "other");
    assert_eq!(rules[0].conditions.request_types, vec![RequestKind::Chat]);

    assert!(store.delete_routing_rule(&created.id).await.unwrap());
    assert!(!store.delete_routing_rule(&created.id).await.unwrap());
    assert!(store.load_routing_rules().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cache_entry_operations() {
    let db = TestDatabase::new().await;
    let store = db.db();

    store.put_cache_entry(&cache_entry("old", 30)).await.unwrap();
    store.put_cache_entry(&cache_entry("mid", 20)).await.unwrap();
    store.put_cache_entry(&cache_entry("new", 10)).await.unwrap();
    assert_eq!(store.count_cache_entries().await.unwrap(), 3);

    let loaded = store.get_cache_entry("mid").await.unwrap().unwrap();
    assert_eq!(loaded.data.text(), "readable");
    assert_eq!(loaded.tokens_used, Some(12));

    // Touching "old" makes "mid" the least recently used
    store.record_cache_hit("old", Utc::now()).await.unwrap();
    assert_eq!(store.get_cache_entry("old").await.unwrap().unwrap().hit_count, 1);

    assert_eq!(store.evict_cache_entries(1).await.unwrap(), 1);
    assert!(store.get_cache_entry("mid").await.unwrap().is_none());
    assert!(store.get_cache_entry("old").await.unwrap().is_some());

    store.delete_cache_entry("new").await.unwrap();
    assert_eq!(store.count_cache_entries().await.unwrap(), 1);
    assert_eq!(store.clear_cache().await.unwrap(), 1);
    assert!(store.get_cache_entry("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_latest_health_per_provider() {
    let db = TestDatabase::new().await;
    let store = db.db();

    store
        .append_health_record(&health("a", HealthStatus::Healthy, 10))
        .await
        .unwrap();
    store
        .append_health_record(&health("a", HealthStatus::Unhealthy, 1))
        .await
        .unwrap();
    store
        .append_health_record(&health("b", HealthStatus::Degraded, 5))
        .await
        .unwrap();

    let mut latest = store.latest_health_records().await.unwrap();
    latest.sort_by(|x, y| x.provider_id.cmp(&y.provider_id));
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].status, HealthStatus::Unhealthy);
    assert_eq!(latest[0].rate_limit_remaining, Some(40));
    assert_eq!(latest[1].status, HealthStatus::Degraded);
}

#[tokio::test]
async fn test_request_logs() {
    let db = TestDatabase::new().await;
    let store = db.db();

    store.insert_request_log(&log_record("r1", true)).await.unwrap();
    store.insert_request_log(&log_record("r2", false)).await.unwrap();

    let logs = store.recent_request_logs(10).await.unwrap();
    assert_eq!(logs.len(), 2);
    let failed = logs.iter().find(|l| l.request_id == "r2").unwrap();
    assert!(!failed.success);
    assert_eq!(failed.error_code, Some(ErrorCode::ProviderError));
    assert_eq!(failed.attempts.len(), 1);

    assert_eq!(store.recent_request_logs(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_tables_read_as_empty() {
    let db = TestDatabase::unmigrated().await;
    let store = db.db();

    assert!(store.load_providers().await.unwrap().is_empty());
    assert!(store.load_routing_rules().await.unwrap().is_empty());
    assert!(store.latest_health_records().await.unwrap().is_empty());
    assert!(store.get_cache_entry("fp").await.unwrap().is_none());
    assert_eq!(store.count_cache_entries().await.unwrap(), 0);

    // Writes are dropped rather than failing
    assert_ok!(store.upsert_provider(&provider_config("p", 1)).await);
    assert_ok!(store.put_cache_entry(&cache_entry("fp", 1)).await);
    assert_ok!(
        store
            .append_health_record(&health("p", HealthStatus::Healthy, 0))
            .await
    );
    assert_ok!(store.insert_request_log(&log_record("r1", true)).await);

    assert!(
        store
            .upsert_routing_rule(&rule_spec("r", 1, RequestKind::Chat, "p"))
            .await
            .is_err()
    );
}
