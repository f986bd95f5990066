//! OpenAI Provider Error Handling
//!
//! OpenAI uses the unified ProviderError with specific constructor methods for OpenAI-specific contexts

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};

pub use crate::core::providers::unified_provider::ProviderError as OpenAIError;

/// Retry hint used when a 429 carries no usable `Retry-After`
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// OpenAI-specific error constructors, tagged with the configured provider id
impl OpenAIError {
    /// Create OpenAI authentication error
    pub fn openai_authentication(provider: &str, message: impl Into<String>) -> Self {
        Self::authentication(provider, message)
    }

    /// Create OpenAI rate limit error
    pub fn openai_rate_limit(provider: &str, retry_after: Option<u64>) -> Self {
        Self::rate_limit(provider, retry_after)
    }

    /// Create OpenAI service unavailable error
    pub fn openai_unavailable(provider: &str, status: u16, message: impl Into<String>) -> Self {
        Self::provider_unavailable(provider, format!("status {}: {}", status, message.into()))
    }

    /// Create OpenAI network error
    pub fn openai_network_error(provider: &str, message: impl Into<String>) -> Self {
        Self::network(provider, message)
    }

    /// Create OpenAI timeout error
    pub fn openai_timeout(provider: &str, message: impl Into<String>) -> Self {
        Self::timeout(provider, message)
    }

    /// Create OpenAI streaming error
    pub fn openai_streaming_error(provider: &str, message: impl Into<String>) -> Self {
        Self::streaming(provider, message)
    }

    /// Create OpenAI response parsing error
    pub fn openai_response_parsing(provider: &str, message: impl Into<String>) -> Self {
        Self::response_parsing(provider, message)
    }
}

/// Map a non-success HTTP response to a provider error
pub fn map_http_error(
    provider: &str,
    status: StatusCode,
    headers: &HeaderMap,
    body: &str,
) -> OpenAIError {
    let message = extract_error_message(body);
    match status.as_u16() {
        401 => OpenAIError::openai_authentication(provider, message),
        429 => OpenAIError::openai_rate_limit(
            provider,
            Some(parse_retry_after(headers).unwrap_or(DEFAULT_RETRY_AFTER_SECS)),
        ),
        code @ 500..=599 => OpenAIError::openai_unavailable(provider, code, message),
        code => OpenAIError::api_error(provider, code, message),
    }
}

/// Map a transport failure
pub fn map_reqwest_error(provider: &str, err: reqwest::Error) -> OpenAIError {
    if err.is_timeout() {
        OpenAIError::openai_timeout(provider, err.to_string())
    } else {
        OpenAIError::openai_network_error(provider, err.to_string())
    }
}

/// Retry-After in whole seconds
pub fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}

/// Vendor error bodies look like `{"error": {"message": ...}}`
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            if body.is_empty() {
                "Unknown error".to_string()
            } else {
                body.to_string()
            }
        })
}
