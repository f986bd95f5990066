//! Error codes reported in broker responses

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable failure category carried by a failed response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NoProvidersAvailable,
    RateLimitExceeded,
    AuthenticationError,
    ServiceUnavailable,
    ProviderError,
    StreamingError,
    ServerError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::NoProvidersAvailable => "NO_PROVIDERS_AVAILABLE",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::AuthenticationError => "AUTHENTICATION_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::ProviderError => "PROVIDER_ERROR",
            Self::StreamingError => "STREAMING_ERROR",
            Self::ServerError => "SERVER_ERROR",
        }
    }

    /// HTTP status used when the response is sent over HTTP
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ValidationError => 400,
            Self::AuthenticationError => 401,
            Self::RateLimitExceeded => 429,
            Self::ProviderError | Self::StreamingError => 502,
            Self::NoProvidersAvailable | Self::ServiceUnavailable => 503,
            Self::ServerError => 500,
        }
    }

    /// Whether an identical request may succeed later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded
                | Self::ServiceUnavailable
                | Self::ProviderError
                | Self::NoProvidersAvailable
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
