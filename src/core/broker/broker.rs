//! Request broker
//!
//! Entry point for every AI request. A request is validated, answered from
//! the response cache when possible, routed to a provider, retried against
//! alternates on failure and logged exactly once, whatever the outcome.

use super::error::BrokerError;
use super::events::{BrokerEvent, BrokerObserver, TracingObserver};
use super::validation::validate_request;
use crate::config::BrokerSettings;
use crate::core::cache_manager::{CachedResponse, ResponseCache};
use crate::core::providers::{AiProvider, ChunkCallback, ProviderRegistry};
use crate::core::router::ModelRouter;
use crate::core::types::{
    BrokerRequest, BrokerResponse, ProviderAttempt, ProviderOutput, RequestKind, RequestLogRecord,
    RequestPriority, ResponseData, ResponseMetadata,
};
use crate::storage::BrokerStore;
use crate::utils::generate_id;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A successful provider call
#[derive(Debug)]
struct Completion {
    provider: Arc<dyn AiProvider>,
    model: String,
    output: ProviderOutput,
}

/// Request fields that end up in the log row
#[derive(Debug, Clone)]
struct LogContext {
    request_id: String,
    user_id: String,
    conversation_id: Option<String>,
    kind: Option<RequestKind>,
    priority: RequestPriority,
    streaming: bool,
}

impl LogContext {
    fn from_request(request: &BrokerRequest, streaming: bool) -> Self {
        Self {
            request_id: request.id.clone(),
            user_id: request.user_id.clone(),
            conversation_id: request.conversation_id.clone(),
            kind: Some(request.kind()),
            priority: request.priority,
            streaming,
        }
    }

    /// Whatever can be recovered from a request that failed to parse
    fn from_raw(value: &Value) -> Self {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Self {
            request_id: field("id").unwrap_or_default(),
            user_id: field("user_id").unwrap_or_default(),
            conversation_id: field("conversation_id"),
            kind: field("type").and_then(|t| t.parse().ok()),
            priority: value
                .get("priority")
                .and_then(|p| serde_json::from_value(p.clone()).ok())
                .unwrap_or_default(),
            streaming: false,
        }
    }
}

/// Coordinates cache, router and provider adapters for each request
#[derive(Debug)]
pub struct RequestBroker {
    registry: Arc<ProviderRegistry>,
    router: Arc<ModelRouter>,
    cache: Arc<ResponseCache>,
    store: Arc<dyn BrokerStore>,
    settings: BrokerSettings,
    observer: Arc<dyn BrokerObserver>,
}

impl RequestBroker {
    /// Create a broker that reports lifecycle events through `tracing`
    pub fn new(
        registry: Arc<ProviderRegistry>,
        router: Arc<ModelRouter>,
        cache: Arc<ResponseCache>,
        store: Arc<dyn BrokerStore>,
        settings: BrokerSettings,
    ) -> Self {
        Self {
            registry,
            router,
            cache,
            store,
            settings,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the event observer
    pub fn with_observer(mut self, observer: Arc<dyn BrokerObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn settings(&self) -> &BrokerSettings {
        &self.settings
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn router(&self) -> &Arc<ModelRouter> {
        &self.router
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// Process a request to completion. Never fails; errors are reported in
    /// the response.
    pub async fn process(&self, request: &BrokerRequest) -> BrokerResponse {
        let started = Instant::now();
        self.emit(BrokerEvent::RequestStarted {
            request_id: request.id.clone(),
            kind: request.kind(),
            streaming: false,
        });

        let mut attempts = Vec::new();
        let result = self.execute(request, started, &mut attempts).await;
        self.conclude(
            LogContext::from_request(request, false),
            result,
            started,
            attempts,
        )
        .await
    }

    /// Parse a wire request and process it.
    ///
    /// A request that does not parse becomes a `VALIDATION_ERROR` response
    /// and is logged with whatever identifiers could be read from it.
    pub async fn process_json(&self, value: Value) -> BrokerResponse {
        match serde_json::from_value::<BrokerRequest>(value.clone()) {
            Ok(request) => self.process(&request).await,
            Err(e) => {
                let started = Instant::now();
                let context = LogContext::from_raw(&value);
                debug!(request_id = %context.request_id, "Rejecting malformed request: {}", e);
                let err = BrokerError::validation(format!("malformed request: {}", e));
                self.conclude(context, Err(err), started, Vec::new()).await
            }
        }
    }

    /// Process a request, forwarding chunks to `on_chunk` as they arrive.
    ///
    /// The cache is neither read nor written and there is no fallback.
    pub async fn process_streaming(
        &self,
        request: &BrokerRequest,
        on_chunk: ChunkCallback,
    ) -> BrokerResponse {
        let started = Instant::now();
        self.emit(BrokerEvent::RequestStarted {
            request_id: request.id.clone(),
            kind: request.kind(),
            streaming: true,
        });

        let mut attempts = Vec::new();
        let result = self
            .execute_streaming(request, on_chunk, started, &mut attempts)
            .await;
        self.conclude(
            LogContext::from_request(request, true),
            result,
            started,
            attempts,
        )
        .await
    }

    async fn execute(
        &self,
        request: &BrokerRequest,
        started: Instant,
        attempts: &mut Vec<ProviderAttempt>,
    ) -> Result<BrokerResponse, BrokerError> {
        validate_request(request)?;

        if self.settings.caching_enabled && self.cache.is_cacheable(request) {
            match self.cache.get(request).await {
                Some(hit) => {
                    self.emit(BrokerEvent::CacheHit {
                        request_id: request.id.clone(),
                        fingerprint: hit.fingerprint.clone(),
                    });
                    return Ok(cached_response(request, hit));
                }
                None => self.emit(BrokerEvent::CacheMiss {
                    request_id: request.id.clone(),
                }),
            }
        }

        let completion = self.dispatch(request, attempts).await?;
        let response = self.build_response(request, &completion, started);
        if self.settings.caching_enabled {
            self.cache.set(request, &response).await;
        }
        Ok(response)
    }

    /// Primary attempt followed by the fallback loop
    async fn dispatch(
        &self,
        request: &BrokerRequest,
        attempts: &mut Vec<ProviderAttempt>,
    ) -> Result<Completion, BrokerError> {
        self.ensure_providers()?;

        let decision = self.router.route(request).await?;
        debug!(
            request_id = %request.id,
            provider = %decision.provider_id,
            model = %decision.model,
            "{}",
            decision.reasoning
        );
        let primary = self.adapter(&decision.provider_id)?;

        let mut last_error = match self.attempt(primary, request, &decision.model, attempts).await {
            Ok(completion) => return Ok(completion),
            Err(e) => e,
        };
        if !self.settings.fallback_enabled || self.settings.max_retries == 0 {
            return Err(last_error);
        }

        let mut failed = decision.provider_id;
        let tried: HashSet<String> = HashSet::from([failed.clone()]);
        let candidates = self
            .router
            .fallback_candidates(&failed, &tried, self.settings.max_retries as usize)
            .await;
        if candidates.is_empty() {
            debug!(request_id = %request.id, "No fallback providers available");
        }

        for candidate in candidates {
            let Some(adapter) = self.registry.get(&candidate.id) else {
                debug!("Fallback provider {} has no adapter, skipping", candidate.id);
                continue;
            };
            self.emit(BrokerEvent::FallbackTriggered {
                request_id: request.id.clone(),
                failed_provider: failed.clone(),
                error_code: last_error.code(),
            });

            let model = self.router.model_for(&candidate, request);
            match self.attempt(adapter, request, &model, attempts).await {
                Ok(completion) => {
                    info!(
                        request_id = %request.id,
                        provider = %candidate.id,
                        "Request served by fallback provider"
                    );
                    return Ok(completion);
                }
                Err(e) => {
                    failed = candidate.id;
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    async fn execute_streaming(
        &self,
        request: &BrokerRequest,
        on_chunk: ChunkCallback,
        started: Instant,
        attempts: &mut Vec<ProviderAttempt>,
    ) -> Result<BrokerResponse, BrokerError> {
        validate_request(request)?;
        self.ensure_providers()?;

        let decision = self.router.route(request).await?;
        let provider = self.adapter(&decision.provider_id)?;

        let call_started = Instant::now();
        let result = provider
            .process_streaming_request(request, &decision.model, on_chunk)
            .await;
        let elapsed = elapsed_ms(call_started);

        match result {
            Ok(output) => {
                attempts.push(ProviderAttempt {
                    provider_id: decision.provider_id,
                    model: decision.model.clone(),
                    response_time_ms: elapsed,
                    success: true,
                    error: None,
                });
                let completion = Completion {
                    provider,
                    model: decision.model,
                    output,
                };
                Ok(self.build_response(request, &completion, started))
            }
            Err(e) => {
                warn!(
                    request_id = %request.id,
                    provider = %decision.provider_id,
                    "Streaming request failed: {}",
                    e
                );
                attempts.push(ProviderAttempt {
                    provider_id: decision.provider_id.clone(),
                    model: decision.model,
                    response_time_ms: elapsed,
                    success: false,
                    error: Some(e.to_string()),
                });
                if e.is_pre_stream() {
                    Err(BrokerError::provider(decision.provider_id, e))
                } else {
                    Err(BrokerError::Streaming {
                        provider_id: decision.provider_id,
                        message: e.to_string(),
                    })
                }
            }
        }
    }

    /// One call to one provider, recorded in `attempts`
    async fn attempt(
        &self,
        provider: Arc<dyn AiProvider>,
        request: &BrokerRequest,
        model: &str,
        attempts: &mut Vec<ProviderAttempt>,
    ) -> Result<Completion, BrokerError> {
        let call_started = Instant::now();
        let result = provider.process_request(request, model).await;
        let elapsed = elapsed_ms(call_started);

        match result {
            Ok(output) => {
                attempts.push(ProviderAttempt {
                    provider_id: provider.id().to_string(),
                    model: model.to_string(),
                    response_time_ms: elapsed,
                    success: true,
                    error: None,
                });
                Ok(Completion {
                    provider,
                    model: model.to_string(),
                    output,
                })
            }
            Err(e) => {
                warn!(
                    request_id = %request.id,
                    provider = %provider.id(),
                    model,
                    retryable = e.is_retryable(),
                    "Provider call failed: {}",
                    e
                );
                attempts.push(ProviderAttempt {
                    provider_id: provider.id().to_string(),
                    model: model.to_string(),
                    response_time_ms: elapsed,
                    success: false,
                    error: Some(e.to_string()),
                });
                Err(BrokerError::provider(provider.id(), e))
            }
        }
    }

    fn ensure_providers(&self) -> Result<(), BrokerError> {
        if self.registry.is_empty() {
            return Err(BrokerError::NoProvidersAvailable(
                "no provider adapters are registered".to_string(),
            ));
        }
        Ok(())
    }

    fn adapter(&self, provider_id: &str) -> Result<Arc<dyn AiProvider>, BrokerError> {
        self.registry.get(provider_id).ok_or_else(|| {
            BrokerError::internal(format!(
                "routed to provider '{}' which has no registered adapter",
                provider_id
            ))
        })
    }

    fn build_response(
        &self,
        request: &BrokerRequest,
        completion: &Completion,
        started: Instant,
    ) -> BrokerResponse {
        let tokens = completion.output.tokens_used;
        let cost = completion
            .provider
            .calculate_cost(request, &completion.model, tokens);
        let rate_limit = completion.provider.rate_limit_status();

        BrokerResponse::success(
            request.id.clone(),
            ResponseData::for_kind(
                request.kind(),
                completion.output.content.clone(),
                request.conversation_id.clone(),
            ),
            ResponseMetadata {
                model_used: Some(completion.model.clone()),
                provider_used: Some(completion.provider.id().to_string()),
                tokens_used: Some(tokens),
                processing_time_ms: elapsed_ms(started),
                cached: false,
                cost: Some(cost),
                rate_limit_remaining: Some(rate_limit.remaining),
            },
        )
    }

    /// Turn the outcome into a response, emit the final event and write the
    /// log row
    async fn conclude(
        &self,
        context: LogContext,
        result: Result<BrokerResponse, BrokerError>,
        started: Instant,
        attempts: Vec<ProviderAttempt>,
    ) -> BrokerResponse {
        let response = match result {
            Ok(response) => {
                self.emit(BrokerEvent::RequestCompleted {
                    request_id: context.request_id.clone(),
                    provider_id: response.metadata.provider_used.clone(),
                    cached: response.metadata.cached,
                    processing_time_ms: response.metadata.processing_time_ms,
                });
                response
            }
            Err(err) => {
                self.emit(BrokerEvent::RequestFailed {
                    request_id: context.request_id.clone(),
                    code: err.code(),
                    message: err.to_string(),
                });
                BrokerResponse::failure(
                    context.request_id.clone(),
                    err.to_response_error(),
                    elapsed_ms(started),
                )
            }
        };

        self.log_request(context, &response, attempts).await;
        response
    }

    async fn log_request(
        &self,
        context: LogContext,
        response: &BrokerResponse,
        attempts: Vec<ProviderAttempt>,
    ) {
        let last_attempt = attempts.last();
        let record = RequestLogRecord {
            id: generate_id(),
            request_id: context.request_id,
            user_id: context.user_id,
            conversation_id: context.conversation_id,
            kind: context.kind,
            priority: context.priority,
            provider_id: response
                .metadata
                .provider_used
                .clone()
                .or_else(|| last_attempt.map(|a| a.provider_id.clone())),
            model: response
                .metadata
                .model_used
                .clone()
                .or_else(|| last_attempt.map(|a| a.model.clone())),
            tokens_used: response.metadata.tokens_used,
            cost: response.metadata.cost,
            processing_time_ms: response.metadata.processing_time_ms,
            cached: response.metadata.cached,
            streaming: context.streaming,
            success: response.success,
            error_code: response.error_code(),
            error_message: response.error.as_ref().map(|e| e.message.clone()),
            attempts,
            created_at: Utc::now(),
        };

        if let Err(e) = self.store.insert_request_log(&record).await {
            warn!(request_id = %record.request_id, "Failed to write request log: {}", e);
        }
    }

    fn emit(&self, event: BrokerEvent) {
        self.observer.on_event(&event);
    }
}

fn cached_response(request: &BrokerRequest, hit: CachedResponse) -> BrokerResponse {
    let data = match hit.data {
        ResponseData::Chat { message, .. } => ResponseData::Chat {
            message,
            conversation_id: request.conversation_id.clone(),
        },
        other => other,
    };
    BrokerResponse::success(
        request.id.clone(),
        data,
        ResponseMetadata {
            model_used: hit.model_used,
            provider_used: hit.provider_used,
            tokens_used: hit.tokens_used,
            processing_time_ms: 0,
            cached: true,
            cost: hit.cost,
            rate_limit_remaining: None,
        },
    )
}

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}
