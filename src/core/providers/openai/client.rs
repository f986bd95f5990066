//! OpenAI HTTP client
//!
//! Thin reqwest wrapper that speaks the chat completions and models
//! endpoints and maps transport and status failures to provider errors.

use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use tracing::debug;

use super::config::OpenAIConfig;
use super::error::{OpenAIError, map_http_error, map_reqwest_error};
use super::transformer::{OpenAIChatRequest, OpenAIChatResponse};

/// Raw body of a streamed completion
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// HTTP client bound to one endpoint and API key
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    http: reqwest::Client,
    config: OpenAIConfig,
}

impl OpenAIClient {
    /// Create client with the configured per-call timeout
    pub fn new(config: OpenAIConfig) -> Result<Self, OpenAIError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout_duration())
            .build()
            .map_err(|e| OpenAIError::configuration(&config.provider_id, e.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(self.config.endpoint(path))
            .bearer_auth(&self.config.api_key)
            .header("Content-Type", "application/json")
    }

    /// Execute chat completion request
    pub async fn chat_completion(
        &self,
        body: &OpenAIChatRequest,
    ) -> Result<OpenAIChatResponse, OpenAIError> {
        debug!(
            "POST chat/completions provider={} model={}",
            self.config.provider_id, body.model
        );
        let response = self
            .post("chat/completions")
            .json(body)
            .send()
            .await
            .map_err(|e| map_reqwest_error(&self.config.provider_id, e))?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_http_error(
                &self.config.provider_id,
                status,
                &headers,
                &error_text,
            ));
        }

        response
            .json::<OpenAIChatResponse>()
            .await
            .map_err(|e| {
                OpenAIError::openai_response_parsing(&self.config.provider_id, e.to_string())
            })
    }

    /// Open a streamed chat completion; errors before the first byte surface here
    pub async fn chat_completion_stream(
        &self,
        body: &OpenAIChatRequest,
    ) -> Result<ByteStream, OpenAIError> {
        debug!(
            "POST chat/completions (stream) provider={} model={}",
            self.config.provider_id, body.model
        );
        let response = self
            .post("chat/completions")
            .header("Accept", "text/event-stream")
            .json(body)
            .send()
            .await
            .map_err(|e| map_reqwest_error(&self.config.provider_id, e))?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_http_error(
                &self.config.provider_id,
                status,
                &headers,
                &error_text,
            ));
        }

        Ok(Box::pin(response.bytes_stream()))
    }

    /// Probe the models endpoint
    pub async fn list_models(&self) -> Result<(), OpenAIError> {
        let response = self
            .http
            .get(self.config.endpoint("models"))
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| map_reqwest_error(&self.config.provider_id, e))?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let error_text = response.text().await.unwrap_or_default();
            return Err(map_http_error(
                &self.config.provider_id,
                status,
                &headers,
                &error_text,
            ));
        }
        Ok(())
    }
}
