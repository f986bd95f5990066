//! Provider configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Stable identifier used by rules, health records and logs
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Vendor type; only OpenAI-compatible endpoints are built in
    #[serde(default = "default_provider_type")]
    pub provider_type: String,
    /// API key, may reference `${ENV_VAR}`
    #[serde(default)]
    pub api_key: String,
    /// Base URL
    #[serde(default)]
    pub base_url: Option<String>,
    /// Supported models
    #[serde(default)]
    pub models: Vec<String>,
    /// Model used when nothing more specific applies
    #[serde(default)]
    pub default_model: Option<String>,
    /// Model for urgent and real-time requests
    #[serde(default)]
    pub fast_model: Option<String>,
    /// Model for complex and multimodal requests
    #[serde(default)]
    pub capable_model: Option<String>,
    /// Higher priority providers are preferred
    #[serde(default)]
    pub priority: i32,
    /// Whether provider is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Maximum requests per minute
    #[serde(default = "default_rpm")]
    pub rpm: u32,
    /// Maximum tokens per minute
    #[serde(default = "default_tpm")]
    pub tpm: u32,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Provider tried first when this one fails
    #[serde(default)]
    pub fallback_provider: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            provider_type: default_provider_type(),
            api_key: String::new(),
            base_url: None,
            models: Vec::new(),
            default_model: None,
            fast_model: None,
            capable_model: None,
            priority: 0,
            enabled: true,
            rpm: default_rpm(),
            tpm: default_tpm(),
            timeout: default_timeout(),
            fallback_provider: None,
        }
    }
}

impl ProviderConfig {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    pub fn supports_model(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }

    /// Default model, else the first listed model
    pub fn default_model(&self) -> Option<&str> {
        self.default_model
            .as_deref()
            .or_else(|| self.models.first().map(String::as_str))
    }

    pub fn fast_model(&self) -> Option<&str> {
        self.fast_model.as_deref().or_else(|| self.default_model())
    }

    pub fn capable_model(&self) -> Option<&str> {
        self.capable_model.as_deref().or_else(|| self.default_model())
    }

    /// Validate provider configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("id cannot be empty".to_string());
        }
        if self.provider_type != "openai" {
            return Err(format!(
                "unsupported provider_type '{}' (expected 'openai')",
                self.provider_type
            ));
        }
        if self.default_model().is_none() {
            return Err("at least one model or a default_model is required".to_string());
        }
        if self.rpm == 0 {
            return Err("rpm must be greater than 0".to_string());
        }
        if self.timeout == 0 {
            return Err("timeout must be greater than 0".to_string());
        }
        if let Some(url) = &self.base_url {
            url::Url::parse(url).map_err(|e| format!("invalid base_url: {}", e))?;
        }
        if self.fallback_provider.as_deref() == Some(self.id.as_str()) {
            return Err("fallback_provider cannot point at itself".to_string());
        }
        Ok(())
    }
}

fn default_provider_type() -> String {
    "openai".to_string()
}
