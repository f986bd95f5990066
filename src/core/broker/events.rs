//! Broker lifecycle events
//!
//! The broker reports what it does to an injected [`BrokerObserver`].
//! Observers only watch; nothing they do changes how a request is handled.

use crate::core::types::{ErrorCode, RequestKind};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Something that happened while handling a request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BrokerEvent {
    RequestStarted {
        request_id: String,
        kind: RequestKind,
        streaming: bool,
    },
    CacheHit {
        request_id: String,
        fingerprint: String,
    },
    CacheMiss {
        request_id: String,
    },
    FallbackTriggered {
        request_id: String,
        failed_provider: String,
        error_code: ErrorCode,
    },
    RequestCompleted {
        request_id: String,
        provider_id: Option<String>,
        cached: bool,
        processing_time_ms: u64,
    },
    RequestFailed {
        request_id: String,
        code: ErrorCode,
        message: String,
    },
}

impl BrokerEvent {
    pub fn request_id(&self) -> &str {
        match self {
            Self::RequestStarted { request_id, .. }
            | Self::CacheHit { request_id, .. }
            | Self::CacheMiss { request_id }
            | Self::FallbackTriggered { request_id, .. }
            | Self::RequestCompleted { request_id, .. }
            | Self::RequestFailed { request_id, .. } => request_id,
        }
    }
}

/// Receives broker events
pub trait BrokerObserver: Send + Sync + std::fmt::Debug {
    fn on_event(&self, event: &BrokerEvent);
}

/// Emits every event as a structured `tracing` record
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl BrokerObserver for TracingObserver {
    fn on_event(&self, event: &BrokerEvent) {
        match event {
            BrokerEvent::RequestStarted {
                request_id,
                kind,
                streaming,
            } => debug!(request_id, %kind, streaming, "request started"),
            BrokerEvent::CacheHit {
                request_id,
                fingerprint,
            } => debug!(request_id, fingerprint, "cache hit"),
            BrokerEvent::CacheMiss { request_id } => debug!(request_id, "cache miss"),
            BrokerEvent::FallbackTriggered {
                request_id,
                failed_provider,
                error_code,
            } => warn!(request_id, failed_provider, %error_code, "fallback triggered"),
            BrokerEvent::RequestCompleted {
                request_id,
                provider_id,
                cached,
                processing_time_ms,
            } => info!(
                request_id,
                provider_id = provider_id.as_deref().unwrap_or("-"),
                cached,
                processing_time_ms,
                "request completed"
            ),
            BrokerEvent::RequestFailed {
                request_id,
                code,
                message,
            } => warn!(request_id, %code, message, "request failed"),
        }
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl BrokerObserver for NoopObserver {
    fn on_event(&self, _event: &BrokerEvent) {}
}

/// Default channel capacity
const DEFAULT_CAPACITY: usize = 1024;

/// Publishes events on a tokio broadcast channel for external subscribers.
///
/// When the channel is full the oldest events are dropped for slow
/// subscribers.
#[derive(Debug, Clone)]
pub struct BroadcastObserver {
    sender: broadcast::Sender<BrokerEvent>,
}

impl BroadcastObserver {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BrokerEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl BrokerObserver for BroadcastObserver {
    fn on_event(&self, event: &BrokerEvent) {
        // No subscribers is not an error
        let _ = self.sender.send(event.clone());
    }
}
