//! Provider adapters with scripted behavior

use ai_request_broker::core::providers::{AiProvider, ChunkCallback, ProviderError};
use ai_request_broker::core::types::{
    BrokerRequest, CapabilityTier, ModelCapabilities, ProviderHealthCheck, ProviderOutput,
    RateLimitStatus, SpeedTier, StreamChunk,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Adapter that replays queued results, then answers successfully
#[derive(Debug)]
pub struct ScriptedProvider {
    id: String,
    models: Vec<String>,
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    calls: AtomicUsize,
    models_used: Mutex<Vec<String>>,
    tokens: u32,
    healthy: AtomicBool,
}

impl ScriptedProvider {
    pub fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            models: vec!["model-a".to_string(), "model-fast".to_string()],
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            models_used: Mutex::new(Vec::new()),
            tokens: 42,
            healthy: AtomicBool::new(true),
        })
    }

    /// Provider whose next call fails with `error`
    pub fn failing_once(id: &str, error: ProviderError) -> Arc<Self> {
        let provider = Self::new(id);
        provider.push(Err(error));
        provider
    }

    /// Provider that always fails with `error`
    pub fn always_failing(id: &str, error: ProviderError) -> Arc<Self> {
        let provider = Self::new(id);
        for _ in 0..32 {
            provider.push(Err(error.clone()));
        }
        provider
    }

    pub fn push(&self, result: Result<String, ProviderError>) {
        self.script.lock().push_back(result);
    }

    /// Flip what the next health probe reports
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn models_used(&self) -> Vec<String> {
        self.models_used.lock().clone()
    }

    fn next(&self, model: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.models_used.lock().push(model.to_string());
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("answer from {}", self.id)))
    }
}

#[async_trait]
impl AiProvider for ScriptedProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.id
    }

    fn supported_models(&self) -> &[String] {
        &self.models
    }

    async fn process_request(
        &self,
        _request: &BrokerRequest,
        model: &str,
    ) -> Result<ProviderOutput, ProviderError> {
        self.next(model).map(|content| ProviderOutput {
            content,
            tokens_used: self.tokens,
        })
    }

    async fn process_streaming_request(
        &self,
        _request: &BrokerRequest,
        model: &str,
        on_chunk: ChunkCallback,
    ) -> Result<ProviderOutput, ProviderError> {
        let content = self.next(model)?;
        let mut sent = String::new();
        for word in content.split_inclusive(' ') {
            sent.push_str(word);
            on_chunk(StreamChunk {
                content: word.to_string(),
                tokens: sent.len().div_ceil(4) as u32,
                finished: false,
            });
        }
        on_chunk(StreamChunk {
            content: String::new(),
            tokens: self.tokens,
            finished: true,
        });
        Ok(ProviderOutput {
            content,
            tokens_used: self.tokens,
        })
    }

    async fn health_check(&self) -> ProviderHealthCheck {
        let healthy = self.healthy.load(Ordering::SeqCst);
        ProviderHealthCheck {
            healthy,
            response_time_ms: 5,
            error: (!healthy).then(|| format!("{} is down", self.id)),
        }
    }

    fn rate_limit_status(&self) -> RateLimitStatus {
        RateLimitStatus {
            limit: 60,
            remaining: 60 - self.calls().min(60) as u32,
            reset_in_secs: 60,
        }
    }

    fn calculate_cost(&self, _request: &BrokerRequest, _model: &str, tokens: u32) -> f64 {
        tokens as f64 / 1000.0 * 0.002
    }

    fn model_capabilities(&self, model: &str) -> ModelCapabilities {
        ModelCapabilities {
            model: model.to_string(),
            context_window: 8192,
            supports_vision: false,
            supports_streaming: true,
            speed: SpeedTier::Balanced,
            capability: CapabilityTier::Standard,
            input_cost_per_1k: 0.002,
            output_cost_per_1k: 0.002,
        }
    }

    fn select_model(&self, _request: &BrokerRequest) -> String {
        "model-a".to_string()
    }

    fn error_rate(&self) -> f64 {
        0.0
    }
}
