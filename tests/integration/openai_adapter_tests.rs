//! OpenAI-compatible adapter tests against a mock vendor

use crate::common::fixtures::{self, provider_config};
use ai_request_broker::config::{BrokerSettings, RouterConfig};
use ai_request_broker::core::broker::RequestBroker;
use ai_request_broker::core::cache_manager::ResponseCache;
use ai_request_broker::core::providers::openai::OpenAIConfig;
use ai_request_broker::core::providers::{
    AiProvider, ChunkCallback, OpenAIProvider, ProviderError, ProviderRegistry,
};
use ai_request_broker::core::router::ModelRouter;
use ai_request_broker::core::types::{ErrorCode, StreamChunk};
use ai_request_broker::storage::BrokerStore;
use ai_request_broker::storage::memory::MemoryStore;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{bearer_token, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, id: &str) -> OpenAIConfig {
    OpenAIConfig {
        provider_id: id.to_string(),
        name: id.to_string(),
        api_key: "sk-test".to_string(),
        api_base: format!("{}/v1", server.uri()),
        timeout: 5,
        ..Default::default()
    }
}

fn provider_for(server: &MockServer) -> OpenAIProvider {
    OpenAIProvider::new(config_for(server, "mock")).unwrap()
}

fn completion(content: &str, total_tokens: u32) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": total_tokens - 10, "total_tokens": total_tokens}
    })
}

fn sse_body(parts: &[&str]) -> String {
    let mut body = String::new();
    for part in parts {
        body.push_str(&format!(
            "data: {}\n\n",
            json!({"choices": [{"delta": {"content": part}, "finish_reason": null}]})
        ));
    }
    body.push_str("data: {\"choices\":[],\"usage\":{\"total_tokens\":33}}\n\n");
    body.push_str("data: [DONE]\n\n");
    body
}

#[tokio::test]
async fn test_completion_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(bearer_token("sk-test"))
        .and(body_partial_json(json!({"model": "gpt-4o-mini", "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Hello there", 25)))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let output = provider
        .process_request(&fixtures::chat("r1", "hi", None), "gpt-4o-mini")
        .await
        .unwrap();

    assert_eq!(output.content, "Hello there");
    assert_eq!(output.tokens_used, 25);
    assert_eq!(provider.rate_limit_status().remaining, 59);
    assert_eq!(provider.error_rate(), 0.0);
}

#[tokio::test]
async fn test_rate_limit_uses_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "17")
                .set_body_json(json!({"error": {"message": "slow down"}})),
        )
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .process_request(&fixtures::generation("r1"), "gpt-4o-mini")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::RateLimitExceeded);
    assert_eq!(err.retry_delay(), Some(17));
    assert_eq!(err.provider(), "mock");
    assert!(err.to_string().starts_with("Rate limit exceeded for mock"));
}

#[tokio::test]
async fn test_rate_limit_without_header_uses_default() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .process_request(&fixtures::generation("r1"), "gpt-4o-mini")
        .await
        .unwrap_err();
    assert_eq!(err.retry_delay(), Some(60));
}

#[tokio::test]
async fn test_status_mapping() {
    let cases = [
        (401, ErrorCode::AuthenticationError),
        (503, ErrorCode::ServiceUnavailable),
        (400, ErrorCode::ProviderError),
    ];
    for (status, expected) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(status)
                    .set_body_json(json!({"error": {"message": format!("status {}", status)}})),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider
            .process_request(&fixtures::generation("r1"), "gpt-4o-mini")
            .await
            .unwrap_err();
        assert_eq!(err.code(), expected, "status {}", status);
        assert!(err.to_string().contains(&format!("status {}", status)));
        assert_eq!(provider.error_rate(), 1.0);
    }
}

#[tokio::test]
async fn test_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .process_request(&fixtures::generation("r1"), "gpt-4o-mini")
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::ResponseParsing { .. }));
    assert_eq!(err.code(), ErrorCode::ProviderError);
}

#[tokio::test]
async fn test_unreachable_vendor() {
    let server = MockServer::start().await;
    let config = config_for(&server, "gone");
    drop(server);

    let err = OpenAIProvider::new(config)
        .unwrap()
        .process_request(&fixtures::generation("r1"), "gpt-4o-mini")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ProviderError);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_streaming_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Accept", "text/event-stream"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/event-stream")
                .set_body_string(sse_body(&["Photo", "synthesis", " is"])),
        )
        .mount(&server)
        .await;

    let chunks: Arc<Mutex<Vec<StreamChunk>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = chunks.clone();
    let on_chunk: ChunkCallback = Arc::new(move |chunk| sink.lock().push(chunk));

    let output = provider_for(&server)
        .process_streaming_request(&fixtures::generation("r1"), "gpt-4o-mini", on_chunk)
        .await
        .unwrap();
    assert_eq!(output.content, "Photosynthesis is");
    assert_eq!(output.tokens_used, 33);

    let chunks = chunks.lock();
    let streamed: String = chunks.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(streamed, "Photosynthesis is");
    let last = chunks.last().unwrap();
    assert!(last.finished);
    assert_eq!(last.tokens, 33);
    assert_eq!(chunks.iter().filter(|c| c.finished).count(), 1);
}

#[tokio::test]
async fn test_streaming_rejected_before_open() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let noop: ChunkCallback = Arc::new(|_| {});
    let err = provider_for(&server)
        .process_streaming_request(&fixtures::generation("r1"), "gpt-4o-mini", noop)
        .await
        .unwrap_err();
    assert!(err.is_pre_stream());
}

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;
    let check = provider_for(&server).health_check().await;
    assert!(check.healthy);
    assert!(check.error.is_none());

    let failing = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&failing)
        .await;
    let check = provider_for(&failing).health_check().await;
    assert!(!check.healthy);
    assert!(check.error.is_some());
}

#[tokio::test]
async fn test_local_rate_limit_blocks_before_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok", 20)))
        .expect(2)
        .mount(&server)
        .await;

    let provider = OpenAIProvider::new(OpenAIConfig {
        rpm: 2,
        ..config_for(&server, "tiny")
    })
    .unwrap();

    for _ in 0..2 {
        provider
            .process_request(&fixtures::generation("r1"), "gpt-4o-mini")
            .await
            .unwrap();
    }
    let err = provider
        .process_request(&fixtures::generation("r1"), "gpt-4o-mini")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::RateLimitExceeded);
    assert!(err.retry_delay().is_some());
    assert_eq!(provider.rate_limit_status().remaining, 0);
}

#[tokio::test]
async fn test_broker_falls_back_between_vendors() {
    let limited = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .expect(1)
        .mount(&limited)
        .await;
    let healthy = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("from backup", 40)))
        .expect(1)
        .mount(&healthy)
        .await;

    let mut primary = provider_config("primary", 10);
    primary.api_key = "sk-a".to_string();
    primary.base_url = Some(format!("{}/v1", limited.uri()));
    let mut backup = provider_config("backup", 5);
    backup.api_key = "sk-b".to_string();
    backup.base_url = Some(format!("{}/v1", healthy.uri()));

    let store: Arc<dyn BrokerStore> = Arc::new(MemoryStore::new());
    store.upsert_provider(&primary).await.unwrap();
    store.upsert_provider(&backup).await.unwrap();

    let registry = Arc::new(ProviderRegistry::from_configs(&[primary, backup]).unwrap());
    let router = Arc::new(ModelRouter::new(store.clone(), &RouterConfig::default()));
    let cache = Arc::new(ResponseCache::new(store.clone(), Default::default()));
    let broker = RequestBroker::new(registry, router, cache, store, BrokerSettings::default());

    let response = broker.process(&fixtures::generation("r1")).await;
    assert!(response.success, "{:?}", response.error);
    assert_eq!(response.data.unwrap().text(), "from backup");
    assert_eq!(response.metadata.provider_used.as_deref(), Some("backup"));
    assert_eq!(response.metadata.model_used.as_deref(), Some("model-a"));
    assert_eq!(response.metadata.tokens_used, Some(40));
}
