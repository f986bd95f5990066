//! Test fixtures and data factories

use ai_request_broker::config::ProviderConfig;
use ai_request_broker::core::types::{
    AnalysisParams, BrokerRequest, CachingOptions, ChatParams, GenerationParams, RequestKind,
    RoutingConditions, RoutingRuleSpec, RoutingTarget,
};

/// Generation request on a fixed topic
pub fn generation(id: &str) -> BrokerRequest {
    generation_about(id, "Photosynthesis")
}

pub fn generation_about(id: &str, topic: &str) -> BrokerRequest {
    BrokerRequest::generation(
        id,
        "user-1",
        GenerationParams {
            topic: Some(topic.to_string()),
            subject: Some("biology".to_string()),
            material_type: Some("worksheet".to_string()),
            ..Default::default()
        },
    )
}

/// Chat request, optionally with a subject
pub fn chat(id: &str, message: &str, subject: Option<&str>) -> BrokerRequest {
    BrokerRequest::chat(
        id,
        "user-1",
        ChatParams {
            message: Some(message.to_string()),
            subject: subject.map(str::to_string),
            ..Default::default()
        },
    )
}

pub fn analysis(id: &str, content: &str) -> BrokerRequest {
    BrokerRequest::analysis(
        id,
        "user-1",
        AnalysisParams {
            content: Some(content.to_string()),
            analysis_type: Some("readability".to_string()),
            ..Default::default()
        },
    )
}

/// Caching directives with an explicit TTL
pub fn caching_ttl(ttl_seconds: u64) -> CachingOptions {
    CachingOptions {
        ttl_seconds: Some(ttl_seconds),
        ..Default::default()
    }
}

/// Enabled provider config serving `model-a` and `model-fast`
pub fn provider_config(id: &str, priority: i32) -> ProviderConfig {
    ProviderConfig {
        id: id.to_string(),
        name: id.to_string(),
        priority,
        models: vec!["model-a".to_string(), "model-fast".to_string()],
        default_model: Some("model-a".to_string()),
        fast_model: Some("model-fast".to_string()),
        ..Default::default()
    }
}

/// Rule sending one request kind to a provider
pub fn rule_spec(name: &str, priority: i32, kind: RequestKind, provider_id: &str) -> RoutingRuleSpec {
    RoutingRuleSpec {
        name: name.to_string(),
        priority,
        enabled: true,
        conditions: RoutingConditions {
            request_types: vec![kind],
            ..Default::default()
        },
        target: RoutingTarget {
            provider_id: provider_id.to_string(),
            model: "model-a".to_string(),
        },
    }
}
