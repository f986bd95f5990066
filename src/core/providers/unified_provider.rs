//! Unified Provider Error Handling
//!
//! Single error type for every provider adapter.
//!
//! | Variant | Purpose | Response code | Retryable |
//! |------|------|------------|--------|
//! | Authentication | Credentials rejected | AUTHENTICATION_ERROR | No |
//! | RateLimit | Vendor or local rate limit | RATE_LIMIT_EXCEEDED | Yes (after delay) |
//! | ProviderUnavailable | Vendor 5xx / outage | SERVICE_UNAVAILABLE | Yes |
//! | Network | Connection failure | PROVIDER_ERROR | Yes |
//! | Timeout | Call exceeded its timeout | PROVIDER_ERROR | Yes |
//! | ApiError | Any other HTTP failure | by status | by status |
//! | Streaming | Stream broke after opening | STREAMING_ERROR | Yes |
//! | ResponseParsing / Configuration / Other | | PROVIDER_ERROR | No |
//!
//! ```rust,ignore
//! let err = ProviderError::rate_limit("openai", Some(60));
//! if err.is_retryable() {
//!     if let Some(delay) = err.retry_delay() {
//!         println!("Retry after {} seconds", delay);
//!     }
//! }
//! ```

use crate::core::types::ErrorCode;

/// Unified provider error type - single error for all providers
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("Authentication failed for {provider}: {message}")]
    Authentication {
        provider: String,
        message: String,
    },

    #[error("Rate limit exceeded for {provider}: {message}")]
    RateLimit {
        provider: String,
        message: String,
        retry_after: Option<u64>,
    },

    #[error("Network error for {provider}: {message}")]
    Network {
        provider: String,
        message: String,
    },

    #[error("Provider {provider} is unavailable: {message}")]
    ProviderUnavailable {
        provider: String,
        message: String,
    },

    #[error("Configuration error for {provider}: {message}")]
    Configuration {
        provider: String,
        message: String,
    },

    #[error("Timeout for {provider}: {message}")]
    Timeout {
        provider: String,
        message: String,
    },

    /// API error with status code
    #[error("API error for {provider} (status {status}): {message}")]
    ApiError {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Response parsing error for {provider}: {message}")]
    ResponseParsing {
        provider: String,
        message: String,
    },

    #[error("Streaming error for {provider}: {message}")]
    Streaming {
        provider: String,
        message: String,
    },

    #[error("{provider} error: {message}")]
    Other {
        provider: String,
        message: String,
    },
}

impl ProviderError {
    pub fn authentication(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Authentication {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn rate_limit(provider: impl Into<String>, retry_after: Option<u64>) -> Self {
        Self::RateLimit {
            provider: provider.into(),
            message: match retry_after {
                Some(secs) => format!("Rate limit exceeded, retry after {} seconds", secs),
                None => "Rate limit exceeded".to_string(),
            },
            retry_after,
        }
    }

    pub fn network(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn provider_unavailable(
        provider: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ProviderUnavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn configuration(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn timeout(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Timeout {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn api_error(
        provider: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::ApiError {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    pub fn response_parsing(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ResponseParsing {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn streaming(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Streaming {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn other(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Other {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Id of the provider that raised the error
    pub fn provider(&self) -> &str {
        match self {
            Self::Authentication { provider, .. }
            | Self::RateLimit { provider, .. }
            | Self::Network { provider, .. }
            | Self::ProviderUnavailable { provider, .. }
            | Self::Configuration { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::ApiError { provider, .. }
            | Self::ResponseParsing { provider, .. }
            | Self::Streaming { provider, .. }
            | Self::Other { provider, .. } => provider,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. }
            | Self::Timeout { .. }
            | Self::RateLimit { .. }
            | Self::ProviderUnavailable { .. }
            | Self::Streaming { .. } => true,

            // API errors depend on status code
            Self::ApiError { status, .. } => matches!(*status, 429 | 500..=599),

            Self::Authentication { .. }
            | Self::Configuration { .. }
            | Self::ResponseParsing { .. }
            | Self::Other { .. } => false,
        }
    }

    /// Suggested delay in seconds before retrying the same provider
    pub fn retry_delay(&self) -> Option<u64> {
        match self {
            Self::RateLimit { retry_after, .. } => *retry_after,
            Self::Network { .. } | Self::Timeout { .. } => Some(1),
            Self::ProviderUnavailable { .. } => Some(5),
            Self::Streaming { .. } => Some(2),
            Self::ApiError { status, .. } => match *status {
                429 => Some(60),
                500..=599 => Some(3),
                _ => None,
            },
            Self::Authentication { .. }
            | Self::Configuration { .. }
            | Self::ResponseParsing { .. }
            | Self::Other { .. } => None,
        }
    }

    /// Response error code this failure is reported as
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Authentication { .. } => ErrorCode::AuthenticationError,
            Self::RateLimit { .. } => ErrorCode::RateLimitExceeded,
            Self::ProviderUnavailable { .. } => ErrorCode::ServiceUnavailable,
            Self::Streaming { .. } => ErrorCode::StreamingError,
            Self::ApiError { status, .. } => match *status {
                401 => ErrorCode::AuthenticationError,
                429 => ErrorCode::RateLimitExceeded,
                500..=599 => ErrorCode::ServiceUnavailable,
                _ => ErrorCode::ProviderError,
            },
            Self::Network { .. }
            | Self::Timeout { .. }
            | Self::Configuration { .. }
            | Self::ResponseParsing { .. }
            | Self::Other { .. } => ErrorCode::ProviderError,
        }
    }

    /// Whether this error was raised before any stream was opened and carries a
    /// more specific code than a generic streaming failure
    pub fn is_pre_stream(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::RateLimitExceeded
                | ErrorCode::AuthenticationError
                | ErrorCode::ServiceUnavailable
        )
    }
}
