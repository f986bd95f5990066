//! Broker error types
//!
//! Every failure inside the broker is a [`BrokerError`]; it is converted to
//! a [`ResponseError`] at the `process` boundary and never escapes as `Err`.

use crate::core::providers::ProviderError;
use crate::core::router::RouterError;
use crate::core::types::{ErrorCode, ResponseError};
use serde_json::json;

#[derive(Debug, Clone, thiserror::Error)]
pub enum BrokerError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("No providers available: {0}")]
    NoProvidersAvailable(String),

    /// A provider adapter failed
    #[error("Provider {provider_id} failed: {source}")]
    Provider {
        provider_id: String,
        #[source]
        source: ProviderError,
    },

    /// A stream failed after it was opened
    #[error("Streaming failed on {provider_id}: {message}")]
    Streaming {
        provider_id: String,
        message: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BrokerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn provider(provider_id: impl Into<String>, source: ProviderError) -> Self {
        Self::Provider {
            provider_id: provider_id.into(),
            source,
        }
    }

    /// Response code this error is reported as
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::NoProvidersAvailable(_) => ErrorCode::NoProvidersAvailable,
            Self::Provider { source, .. } => source.code(),
            Self::Streaming { .. } => ErrorCode::StreamingError,
            Self::Internal(_) => ErrorCode::ServerError,
        }
    }

    /// Seconds the caller should wait before retrying, when known
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::Provider { source, .. } => match source.code() {
                ErrorCode::RateLimitExceeded | ErrorCode::ServiceUnavailable => {
                    source.retry_delay()
                }
                _ => None,
            },
            _ => None,
        }
    }

    pub fn provider_id(&self) -> Option<&str> {
        match self {
            Self::Provider { provider_id, .. } | Self::Streaming { provider_id, .. } => {
                Some(provider_id)
            }
            _ => None,
        }
    }

    /// Convert into the wire error
    pub fn to_response_error(&self) -> ResponseError {
        let mut error = ResponseError::new(self.code(), self.to_string());
        error.retry_after = self.retry_after();

        let mut details = serde_json::Map::new();
        if let Some(provider_id) = self.provider_id() {
            details.insert("provider_id".to_string(), json!(provider_id));
        }
        if let Some(retry_after) = error.retry_after {
            details.insert("retry_after".to_string(), json!(retry_after));
        }
        if !details.is_empty() {
            error.details = Some(serde_json::Value::Object(details));
        }
        error
    }
}

impl From<RouterError> for BrokerError {
    fn from(err: RouterError) -> Self {
        match err {
            RouterError::NoProvidersAvailable(message) => Self::NoProvidersAvailable(message),
        }
    }
}
