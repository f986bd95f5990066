//! OpenAI Provider Implementation
//!
//! [`AiProvider`] over any OpenAI-compatible chat completions endpoint.

use async_trait::async_trait;
use futures::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, warn};

use super::client::OpenAIClient;
use super::config::OpenAIConfig;
use super::error::OpenAIError;
use super::models::{OpenAIModelRegistry, get_openai_registry};
use super::streaming::{OpenAISseParser, StreamAccumulator};
use super::transformer::{
    OpenAIRequestTransformer, OpenAIResponseTransformer, estimate_call_tokens,
};
use crate::core::rate_limiter::SlidingWindowLimiter;
use crate::core::router::complexity::assess_complexity;
use crate::core::traits::{AiProvider, ChunkCallback};
use crate::core::types::{
    BrokerRequest, Complexity, ModelCapabilities, ProviderHealthCheck, ProviderOutput,
    RateLimitStatus, RequestKind,
};

/// OpenAI-compatible provider adapter
#[derive(Debug)]
pub struct OpenAIProvider {
    client: OpenAIClient,
    limiter: SlidingWindowLimiter,
    model_registry: &'static OpenAIModelRegistry,
    total_calls: AtomicU64,
    failed_calls: AtomicU64,
}

impl OpenAIProvider {
    /// Create new OpenAI provider
    pub fn new(config: OpenAIConfig) -> Result<Self, OpenAIError> {
        config
            .validate()
            .map_err(|e| OpenAIError::configuration(&config.provider_id, e))?;
        let limiter = SlidingWindowLimiter::new(config.rpm, config.tpm);
        let client = OpenAIClient::new(config)?;
        Ok(Self {
            client,
            limiter,
            model_registry: get_openai_registry(),
            total_calls: AtomicU64::new(0),
            failed_calls: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &OpenAIConfig {
        self.client.config()
    }

    /// Reserve a slot in the request window before any HTTP call
    fn acquire(&self) -> Result<(), OpenAIError> {
        let result = self.limiter.check_and_record();
        if result.allowed {
            Ok(())
        } else {
            debug!(
                "Provider {} rate limited locally: {}/{} requests",
                self.id(),
                result.current_count,
                result.limit
            );
            Err(OpenAIError::openai_rate_limit(
                self.id(),
                result.retry_after_secs,
            ))
        }
    }

    fn record_outcome<T>(&self, result: &Result<T, OpenAIError>) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        if let Err(e) = result {
            self.failed_calls.fetch_add(1, Ordering::Relaxed);
            warn!("Provider {} call failed: {}", self.id(), e);
        }
    }

    async fn complete(
        &self,
        request: &BrokerRequest,
        model: &str,
    ) -> Result<ProviderOutput, OpenAIError> {
        let body = OpenAIRequestTransformer::transform(request, model, false);
        let response = self.client.chat_completion(&body).await?;
        let (content, tokens_used) =
            OpenAIResponseTransformer::transform(self.id(), response, &body.messages)?;
        Ok(ProviderOutput {
            content,
            tokens_used,
        })
    }

    async fn complete_streaming(
        &self,
        request: &BrokerRequest,
        model: &str,
        on_chunk: ChunkCallback,
    ) -> Result<ProviderOutput, OpenAIError> {
        let body = OpenAIRequestTransformer::transform(request, model, true);
        let mut stream = self.client.chat_completion_stream(&body).await?;

        let mut parser = OpenAISseParser::new(self.id());
        let mut accumulator = StreamAccumulator::new();
        while let Some(item) = stream.next().await {
            let bytes =
                item.map_err(|e| OpenAIError::openai_streaming_error(self.id(), e.to_string()))?;
            for event in parser.process_bytes(&bytes)? {
                if let Some(chunk) = accumulator.apply(event) {
                    on_chunk(chunk);
                }
            }
            if accumulator.is_done() {
                break;
            }
        }
        for event in parser.finish()? {
            if let Some(chunk) = accumulator.apply(event) {
                on_chunk(chunk);
            }
        }

        let tokens_used =
            accumulator.tokens_or(estimate_call_tokens(&body.messages, accumulator.content()));
        on_chunk(accumulator.final_chunk(tokens_used));
        Ok(ProviderOutput {
            content: accumulator.into_content(),
            tokens_used,
        })
    }
}

#[async_trait]
impl AiProvider for OpenAIProvider {
    fn id(&self) -> &str {
        &self.config().provider_id
    }

    fn name(&self) -> &str {
        &self.config().name
    }

    fn supported_models(&self) -> &[String] {
        &self.config().models
    }

    async fn process_request(
        &self,
        request: &BrokerRequest,
        model: &str,
    ) -> Result<ProviderOutput, OpenAIError> {
        self.acquire()?;
        let result = self.complete(request, model).await;
        self.record_outcome(&result);
        let output = result?;
        self.limiter.record_tokens(output.tokens_used);
        Ok(output)
    }

    async fn process_streaming_request(
        &self,
        request: &BrokerRequest,
        model: &str,
        on_chunk: ChunkCallback,
    ) -> Result<ProviderOutput, OpenAIError> {
        self.acquire()?;
        let result = self.complete_streaming(request, model, on_chunk).await;
        self.record_outcome(&result);
        let output = result?;
        self.limiter.record_tokens(output.tokens_used);
        Ok(output)
    }

    async fn health_check(&self) -> ProviderHealthCheck {
        let started = Instant::now();
        let result = self.client.list_models().await;
        let response_time_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(()) => ProviderHealthCheck {
                healthy: true,
                response_time_ms,
                error: None,
            },
            Err(e) => ProviderHealthCheck {
                healthy: false,
                response_time_ms,
                error: Some(e.to_string()),
            },
        }
    }

    fn rate_limit_status(&self) -> RateLimitStatus {
        let status = self.limiter.status();
        RateLimitStatus {
            limit: status.limit,
            remaining: status.remaining,
            reset_in_secs: status.reset_after_secs,
        }
    }

    fn calculate_cost(&self, _request: &BrokerRequest, model: &str, tokens: u32) -> f64 {
        tokens as f64 / 1000.0 * self.model_registry.blended_cost_per_1k(model)
    }

    fn model_capabilities(&self, model: &str) -> ModelCapabilities {
        self.model_registry.capabilities(model)
    }

    fn select_model(&self, request: &BrokerRequest) -> String {
        let config = self.config();
        if let Some(preferred) = request.model_preference.as_deref() {
            if config.supports_model(preferred) {
                return preferred.to_string();
            }
        }

        let params = &request.parameters;
        if params.is_real_time() {
            return config.fast_model.clone();
        }
        if params.is_multimodal() {
            return config.capable_model.clone();
        }
        match assess_complexity(request) {
            Complexity::Complex => config.capable_model.clone(),
            _ if request.kind() == RequestKind::Chat => config.default_model.clone(),
            Complexity::Simple => config.fast_model.clone(),
            Complexity::Medium => config.default_model.clone(),
        }
    }

    fn error_rate(&self) -> f64 {
        let total = self.total_calls.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        self.failed_calls.load(Ordering::Relaxed) as f64 / total as f64
    }
}
