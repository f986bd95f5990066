//! OpenAI Provider Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ProviderConfig;

/// Default OpenAI endpoint
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Configuration for one OpenAI-compatible endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    /// Provider id this adapter serves
    pub provider_id: String,
    /// Display name
    pub name: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub api_base: String,
    pub models: Vec<String>,
    pub default_model: String,
    pub fast_model: String,
    pub capable_model: String,
    /// Request timeout in seconds
    pub timeout: u64,
    pub rpm: u32,
    pub tpm: u32,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            provider_id: "openai".to_string(),
            name: "OpenAI".to_string(),
            api_key: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            models: vec!["gpt-4o-mini".to_string(), "gpt-4o".to_string()],
            default_model: "gpt-4o-mini".to_string(),
            fast_model: "gpt-4o-mini".to_string(),
            capable_model: "gpt-4o".to_string(),
            timeout: 60,
            rpm: 60,
            tpm: 100_000,
        }
    }
}

impl OpenAIConfig {
    /// Build adapter configuration from a provider entry
    pub fn from_provider_config(config: &ProviderConfig) -> Self {
        let defaults = Self::default();
        let default_model = config
            .default_model()
            .map(str::to_string)
            .unwrap_or(defaults.default_model);
        let mut models = config.models.clone();
        if models.is_empty() {
            models.push(default_model.clone());
        }

        Self {
            provider_id: config.id.clone(),
            name: config.display_name().to_string(),
            api_key: config.api_key.clone(),
            api_base: config
                .base_url
                .clone()
                .unwrap_or(defaults.api_base)
                .trim_end_matches('/')
                .to_string(),
            fast_model: config
                .fast_model()
                .map(str::to_string)
                .unwrap_or_else(|| default_model.clone()),
            capable_model: config
                .capable_model()
                .map(str::to_string)
                .unwrap_or_else(|| default_model.clone()),
            default_model,
            models,
            timeout: config.timeout,
            rpm: config.rpm,
            tpm: config.tpm,
        }
    }

    /// Get request timeout
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Full URL of an API path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    pub fn supports_model(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.provider_id.is_empty() {
            return Err("provider id is required".to_string());
        }
        if self.api_base.is_empty() {
            return Err("API base URL is required".to_string());
        }
        if self.timeout == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }
        if self.rpm == 0 {
            return Err("rpm must be greater than 0".to_string());
        }
        Ok(())
    }
}
