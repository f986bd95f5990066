//! Request broker integration tests

use crate::common::fixtures::{self, provider_config};
use crate::common::{BrokerHarness, ScriptedProvider};
use ai_request_broker::config::BrokerSettings;
use ai_request_broker::core::broker::BrokerEvent;
use ai_request_broker::core::providers::{ChunkCallback, ProviderError};
use ai_request_broker::core::types::{
    BrokerRequest, ChatParams, ErrorCode, HealthStatus, ProviderHealthRecord, RequestKind,
    RequestPriority, ResponseData,
};
use ai_request_broker::storage::BrokerStore;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_repeat_request_is_served_from_cache() {
    let primary = ScriptedProvider::new("primary");
    let h = BrokerHarness::builder().provider(primary.clone(), 10).build().await;

    let first = h.broker.process(&fixtures::generation("r1")).await;
    let second = h.broker.process(&fixtures::generation("r2")).await;

    assert!(first.success && second.success);
    assert!(!first.metadata.cached);
    assert!(second.metadata.cached);
    assert_eq!(second.metadata.processing_time_ms, 0);
    assert_eq!(second.data, first.data);
    assert_eq!(second.metadata.tokens_used, first.metadata.tokens_used);
    assert_eq!(second.metadata.cost, first.metadata.cost);
    assert_eq!(primary.calls(), 1);

    let logs = h.logs();
    assert_eq!(logs.len(), 2);
    assert!(logs[1].cached);
    assert!(logs[1].attempts.is_empty());
    assert_eq!(
        h.observer
            .count(|e| matches!(e, BrokerEvent::CacheHit { .. })),
        1
    );
}

#[tokio::test]
async fn test_normalized_text_shares_cache_entry() {
    let primary = ScriptedProvider::new("primary");
    let h = BrokerHarness::builder().provider(primary.clone(), 10).build().await;

    let first = fixtures::chat("r1", "  Explain Fractions ", Some("math"));
    let second = fixtures::chat("r2", "explain fractions", Some("math"));

    h.broker.process(&first).await;
    let response = h.broker.process(&second).await;

    assert!(response.metadata.cached);
    assert_eq!(primary.calls(), 1);
}

#[tokio::test]
async fn test_cached_chat_keeps_callers_conversation() {
    let primary = ScriptedProvider::new("primary");
    let h = BrokerHarness::builder().provider(primary, 10).build().await;

    let first = fixtures::chat("r1", "hello", Some("math")).with_conversation("conv-1");
    let second = fixtures::chat("r2", "hello", Some("math")).with_conversation("conv-2");
    h.broker.process(&first).await;
    let response = h.broker.process(&second).await;

    assert!(response.metadata.cached);
    match response.data.unwrap() {
        ResponseData::Chat {
            conversation_id, ..
        } => assert_eq!(conversation_id.as_deref(), Some("conv-2")),
        other => panic!("unexpected data: {:?}", other),
    }
}

#[tokio::test]
async fn test_chat_without_subject_is_never_cached() {
    let primary = ScriptedProvider::new("primary");
    let h = BrokerHarness::builder().provider(primary.clone(), 10).build().await;

    for id in ["r1", "r2"] {
        let response = h.broker.process(&fixtures::chat(id, "hi", None)).await;
        assert!(response.success);
        assert!(!response.metadata.cached);
    }
    assert_eq!(primary.calls(), 2);
    assert_eq!(h.cache.stats().writes, 0);

    for id in ["r3", "r4"] {
        h.broker
            .process(&fixtures::chat(id, "hi", Some("science")))
            .await;
    }
    assert_eq!(primary.calls(), 3);
}

#[tokio::test]
async fn test_urgent_requests_bypass_cache() {
    let primary = ScriptedProvider::new("primary");
    let h = BrokerHarness::builder().provider(primary.clone(), 10).build().await;

    let urgent = fixtures::generation("r1").with_priority(RequestPriority::Urgent);
    h.broker.process(&urgent).await;
    assert_eq!(h.cache.stats().writes, 0);

    // A normal request afterwards finds nothing to reuse
    let normal = h.broker.process(&fixtures::generation("r2")).await;
    assert!(!normal.metadata.cached);

    // And an urgent one does not read what the normal one wrote
    let urgent = fixtures::generation("r3").with_priority(RequestPriority::Urgent);
    let response = h.broker.process(&urgent).await;
    assert!(!response.metadata.cached);
    assert_eq!(primary.calls(), 3);
}

#[tokio::test]
async fn test_global_caching_switch() {
    let primary = ScriptedProvider::new("primary");
    let h = BrokerHarness::builder()
        .provider(primary.clone(), 10)
        .settings(BrokerSettings {
            caching_enabled: false,
            ..Default::default()
        })
        .build()
        .await;

    h.broker.process(&fixtures::generation("r1")).await;
    let response = h.broker.process(&fixtures::generation("r2")).await;
    assert!(!response.metadata.cached);
    assert_eq!(primary.calls(), 2);
}

#[tokio::test]
async fn test_empty_parameters_fail_validation() {
    let primary = ScriptedProvider::new("primary");
    let h = BrokerHarness::builder().provider(primary.clone(), 10).build().await;

    let request = BrokerRequest::chat("r1", "user-1", ChatParams::default());
    let response = h.broker.process(&request).await;

    assert!(!response.success);
    assert_eq!(response.error_code(), Some(ErrorCode::ValidationError));
    assert_eq!(primary.calls(), 0);

    let logs = h.logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].error_code, Some(ErrorCode::ValidationError));
}

#[tokio::test]
async fn test_unknown_type_via_json() {
    let primary = ScriptedProvider::new("primary");
    let h = BrokerHarness::builder().provider(primary.clone(), 10).build().await;

    let response = h
        .broker
        .process_json(json!({"id": "r9", "type": "summarize", "user_id": "u9", "parameters": {}}))
        .await;
    assert_eq!(response.error_code(), Some(ErrorCode::ValidationError));
    assert_eq!(response.request_id, "r9");
    assert_eq!(primary.calls(), 0);
    assert_eq!(h.logs()[0].user_id, "u9");
}

#[tokio::test]
async fn test_wire_request_round_trip() {
    let primary = ScriptedProvider::new("primary");
    let h = BrokerHarness::builder().provider(primary, 10).build().await;

    let response = h
        .broker
        .process_json(json!({
            "id": "r1",
            "type": "analysis",
            "user_id": "u1",
            "priority": "high",
            "parameters": {"content": "The cat sat on the mat."},
            "metadata": {"timestamp": "2025-03-01T10:00:00Z", "user_role": "teacher"}
        }))
        .await;

    assert!(response.success);
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["data"]["analysis"], "answer from primary");
    assert_eq!(value["metadata"]["provider_used"], "primary");
    assert_eq!(value["metadata"]["cached"], false);
}

#[tokio::test]
async fn test_no_registered_adapters() {
    let h = BrokerHarness::builder()
        .config_only(provider_config("ghost", 10))
        .build()
        .await;

    let response = h.broker.process(&fixtures::generation("r1")).await;
    assert_eq!(response.error_code(), Some(ErrorCode::NoProvidersAvailable));
    assert_eq!(h.logs().len(), 1);
}

#[tokio::test]
async fn test_route_to_provider_without_adapter() {
    let primary = ScriptedProvider::new("primary");
    let h = BrokerHarness::builder()
        .provider(primary.clone(), 10)
        .config_only(provider_config("ghost", 100))
        .build()
        .await;

    let response = h.broker.process(&fixtures::generation("r1")).await;
    assert_eq!(response.error_code(), Some(ErrorCode::ServerError));
    assert_eq!(primary.calls(), 0);
}

#[tokio::test]
async fn test_all_providers_unhealthy() {
    let primary = ScriptedProvider::new("primary");
    let h = BrokerHarness::builder().provider(primary.clone(), 10).build().await;
    h.store
        .append_health_record(&ProviderHealthRecord {
            provider_id: "primary".to_string(),
            status: HealthStatus::Unhealthy,
            checked_at: Utc::now(),
            response_time_ms: 0,
            error_rate: 1.0,
            rate_limit_remaining: None,
            error: Some("down".to_string()),
        })
        .await
        .unwrap();
    h.router.invalidate();

    let response = h.broker.process(&fixtures::generation("r1")).await;
    assert_eq!(response.error_code(), Some(ErrorCode::NoProvidersAvailable));
    assert_eq!(primary.calls(), 0);
}

#[tokio::test]
async fn test_rate_limit_without_fallback() {
    let primary =
        ScriptedProvider::failing_once("primary", ProviderError::rate_limit("primary", Some(12)));
    let backup = ScriptedProvider::new("backup");
    let h = BrokerHarness::builder()
        .provider(primary.clone(), 10)
        .provider(backup.clone(), 5)
        .fallback(false, 3)
        .build()
        .await;

    let response = h.broker.process(&fixtures::generation("r1")).await;
    let wire = serde_json::to_value(&response).expect("serialize");
    assert!(wire["error"]["details"]["retry_after"].is_u64());
    assert_eq!(wire["error"]["details"]["retry_after"], 12);

    let error = response.error.expect("error");
    assert_eq!(error.code, ErrorCode::RateLimitExceeded);
    assert_eq!(error.retry_after, Some(12));
    assert_eq!(backup.calls(), 0);
}

#[tokio::test]
async fn test_rate_limit_with_fallback() {
    let primary =
        ScriptedProvider::failing_once("primary", ProviderError::rate_limit("primary", Some(12)));
    let backup = ScriptedProvider::new("backup");
    let h = BrokerHarness::builder()
        .provider(primary.clone(), 10)
        .provider(backup.clone(), 5)
        .build()
        .await;

    let response = h.broker.process(&fixtures::generation("r1")).await;
    assert!(response.success);
    assert_eq!(response.metadata.provider_used.as_deref(), Some("backup"));
    assert_eq!(primary.calls(), 1);
    assert_eq!(backup.calls(), 1);

    let log = &h.logs()[0];
    assert_eq!(log.provider_id.as_deref(), Some("backup"));
    assert_eq!(log.attempts.len(), 2);
    assert_eq!(log.attempts[0].provider_id, "primary");
    assert!(!log.attempts[0].success);

    let fallbacks: Vec<BrokerEvent> = h
        .observer
        .events()
        .into_iter()
        .filter(|e| matches!(e, BrokerEvent::FallbackTriggered { .. }))
        .collect();
    assert_eq!(
        fallbacks,
        vec![BrokerEvent::FallbackTriggered {
            request_id: "r1".to_string(),
            failed_provider: "primary".to_string(),
            error_code: ErrorCode::RateLimitExceeded,
        }]
    );
}

#[tokio::test]
async fn test_fallback_respects_max_retries() {
    let error = ProviderError::provider_unavailable("p", "down");
    let providers: Vec<Arc<ScriptedProvider>> = (0..4)
        .map(|i| ScriptedProvider::always_failing(&format!("p{}", i), error.clone()))
        .collect();

    let mut builder = BrokerHarness::builder().fallback(true, 2);
    for (i, provider) in providers.iter().enumerate() {
        builder = builder.provider(provider.clone(), 100 - i as i32);
    }
    let h = builder.build().await;

    let response = h.broker.process(&fixtures::generation("r1")).await;
    assert_eq!(response.error_code(), Some(ErrorCode::ServiceUnavailable));

    let total: usize = providers.iter().map(|p| p.calls()).sum();
    assert_eq!(total, 3);
    assert_eq!(providers[3].calls(), 0);
    assert_eq!(h.logs()[0].attempts.len(), 3);
}

#[tokio::test]
async fn test_last_error_is_reported() {
    let primary =
        ScriptedProvider::always_failing("primary", ProviderError::network("primary", "reset"));
    let backup = ScriptedProvider::always_failing(
        "backup",
        ProviderError::authentication("backup", "bad key"),
    );
    let h = BrokerHarness::builder()
        .provider(primary, 10)
        .provider(backup, 5)
        .build()
        .await;

    let response = h.broker.process(&fixtures::generation("r1")).await;
    assert_eq!(response.error_code(), Some(ErrorCode::AuthenticationError));
    assert_eq!(h.cache.stats().writes, 0);
}

#[tokio::test]
async fn test_designated_fallback_goes_first() {
    let primary =
        ScriptedProvider::failing_once("primary", ProviderError::timeout("primary", "slow"));
    let busy = ScriptedProvider::new("busy");
    let designated = ScriptedProvider::new("designated");

    let mut primary_config = provider_config("primary", 100);
    primary_config.fallback_provider = Some("designated".to_string());
    let h = BrokerHarness::builder()
        .provider_with(primary, primary_config)
        .provider(busy.clone(), 50)
        .provider(designated.clone(), 1)
        .fallback(true, 1)
        .build()
        .await;

    let response = h.broker.process(&fixtures::generation("r1")).await;
    assert_eq!(response.metadata.provider_used.as_deref(), Some("designated"));
    assert_eq!(busy.calls(), 0);
}

#[tokio::test]
async fn test_rule_routes_request() {
    let primary = ScriptedProvider::new("primary");
    let analyst = ScriptedProvider::new("analyst");
    let h = BrokerHarness::builder()
        .provider(primary.clone(), 100)
        .provider(analyst.clone(), 1)
        .rule(fixtures::rule_spec("analysis", 10, RequestKind::Analysis, "analyst"))
        .build()
        .await;

    let response = h
        .broker
        .process(&fixtures::analysis("r1", "Some essay text"))
        .await;
    assert_eq!(response.metadata.provider_used.as_deref(), Some("analyst"));

    let response = h.broker.process(&fixtures::generation("r2")).await;
    assert_eq!(response.metadata.provider_used.as_deref(), Some("primary"));
}

#[tokio::test]
async fn test_real_time_uses_fast_model() {
    let primary = ScriptedProvider::new("primary");
    let h = BrokerHarness::builder().provider(primary.clone(), 10).build().await;

    let request = BrokerRequest::chat(
        "r1",
        "user-1",
        ChatParams {
            message: Some("quick!".to_string()),
            real_time: Some(true),
            ..Default::default()
        },
    );
    let response = h.broker.process(&request).await;
    assert_eq!(response.metadata.model_used.as_deref(), Some("model-fast"));
    assert_eq!(primary.models_used(), vec!["model-fast"]);
}

#[tokio::test]
async fn test_log_failures_do_not_fail_requests() {
    let primary = ScriptedProvider::new("primary");
    let h = BrokerHarness::builder().provider(primary, 10).build().await;
    h.store.fail_logs(true);

    let response = h.broker.process(&fixtures::generation("r1")).await;
    assert!(response.success);
    assert!(h.logs().is_empty());
}

#[tokio::test]
async fn test_cache_store_failures_degrade_to_misses() {
    let primary = ScriptedProvider::new("primary");
    let h = BrokerHarness::builder().provider(primary.clone(), 10).build().await;
    h.store.fail_cache(true);

    for id in ["r1", "r2"] {
        let response = h.broker.process(&fixtures::generation(id)).await;
        assert!(response.success);
        assert!(!response.metadata.cached);
    }
    assert_eq!(primary.calls(), 2);
    assert!(h.cache.stats().store_errors >= 2);
}

#[tokio::test]
async fn test_streaming_request() {
    let primary = ScriptedProvider::new("primary");
    let h = BrokerHarness::builder().provider(primary.clone(), 10).build().await;

    let chunks = Arc::new(Mutex::new(Vec::new()));
    let sink = chunks.clone();
    let on_chunk: ChunkCallback = Arc::new(move |chunk| sink.lock().push(chunk));

    let response = h
        .broker
        .process_streaming(&fixtures::generation("r1"), on_chunk)
        .await;
    assert!(response.success);
    assert_eq!(
        response.data.as_ref().map(|d| d.text().to_string()),
        Some("answer from primary".to_string())
    );

    let chunks = chunks.lock();
    let text: String = chunks.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(text, "answer from primary");
    assert!(chunks.last().unwrap().finished);
    assert!(chunks[..chunks.len() - 1].iter().all(|c| !c.finished));

    // Streaming neither reads nor writes the cache
    assert_eq!(h.cache.stats().writes, 0);
    let log = &h.logs()[0];
    assert!(log.streaming);
    assert!(log.success);
}

#[tokio::test]
async fn test_streaming_has_no_fallback() {
    let primary =
        ScriptedProvider::failing_once("primary", ProviderError::streaming("primary", "cut off"));
    let backup = ScriptedProvider::new("backup");
    let h = BrokerHarness::builder()
        .provider(primary, 10)
        .provider(backup.clone(), 5)
        .build()
        .await;

    let noop: ChunkCallback = Arc::new(|_| {});
    let response = h
        .broker
        .process_streaming(&fixtures::generation("r1"), noop)
        .await;
    assert_eq!(response.error_code(), Some(ErrorCode::StreamingError));
    assert_eq!(backup.calls(), 0);
}

#[tokio::test]
async fn test_streaming_keeps_pre_stream_codes() {
    let primary = ScriptedProvider::failing_once(
        "primary",
        ProviderError::authentication("primary", "bad key"),
    );
    let h = BrokerHarness::builder().provider(primary, 10).build().await;

    let noop: ChunkCallback = Arc::new(|_| {});
    let response = h
        .broker
        .process_streaming(&fixtures::generation("r1"), noop)
        .await;
    assert_eq!(response.error_code(), Some(ErrorCode::AuthenticationError));
}

#[tokio::test]
async fn test_lifecycle_events() {
    let primary = ScriptedProvider::new("primary");
    let h = BrokerHarness::builder().provider(primary, 10).build().await;

    h.broker.process(&fixtures::generation("r1")).await;
    let events = h.observer.events();

    assert!(matches!(
        events.first(),
        Some(BrokerEvent::RequestStarted { streaming: false, .. })
    ));
    assert!(events.iter().any(|e| matches!(e, BrokerEvent::CacheMiss { .. })));
    assert!(matches!(
        events.last(),
        Some(BrokerEvent::RequestCompleted { cached: false, .. })
    ));
    assert!(events.iter().all(|e| e.request_id() == "r1"));
}
