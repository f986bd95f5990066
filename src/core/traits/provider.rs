//! Core provider trait definition
//!
//! Every vendor adapter the broker can route to implements [`AiProvider`].
//! Adapters own their HTTP client, rate-limit window and error statistics;
//! the broker only sees text, token counts and [`ProviderError`]s.

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use crate::core::providers::unified_provider::ProviderError;
use crate::core::types::{
    BrokerRequest, ModelCapabilities, ProviderHealthCheck, ProviderOutput, RateLimitStatus,
    StreamChunk,
};

/// Callback receiving streamed chunks as they arrive
pub type ChunkCallback = Arc<dyn Fn(StreamChunk) + Send + Sync>;

/// Unified interface for AI provider adapters
#[async_trait]
pub trait AiProvider: Send + Sync + Debug {
    /// Provider id, as referenced by routing rules and logs
    fn id(&self) -> &str;

    /// Display name
    fn name(&self) -> &str;

    fn supported_models(&self) -> &[String];

    /// Run a request to completion
    async fn process_request(
        &self,
        request: &BrokerRequest,
        model: &str,
    ) -> Result<ProviderOutput, ProviderError>;

    /// Run a request, forwarding chunks to `on_chunk` and returning the aggregate
    ///
    /// The last chunk delivered has `finished == true`.
    async fn process_streaming_request(
        &self,
        request: &BrokerRequest,
        model: &str,
        on_chunk: ChunkCallback,
    ) -> Result<ProviderOutput, ProviderError>;

    /// Probe the vendor endpoint
    async fn health_check(&self) -> ProviderHealthCheck;

    fn rate_limit_status(&self) -> RateLimitStatus;

    /// Estimated cost in USD of a call that consumed `tokens`
    fn calculate_cost(&self, request: &BrokerRequest, model: &str, tokens: u32) -> f64;

    fn model_capabilities(&self, model: &str) -> ModelCapabilities;

    /// Choose a model when no router decision is available
    fn select_model(&self, request: &BrokerRequest) -> String;

    /// Fraction of calls that failed, in `[0, 1]`
    fn error_rate(&self) -> f64;
}
