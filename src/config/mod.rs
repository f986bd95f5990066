//! Configuration management for the broker
//!
//! Configuration is read from a YAML file, then selected values can be
//! overridden from the environment. Provider API keys may reference
//! environment variables with `${NAME}`.

pub mod models;

pub use models::*;

use crate::core::types::RoutingRuleSpec;
use crate::utils::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Main configuration struct for the broker service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub broker: BrokerSettings,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
    /// Rules seeded into the store at startup (upserted by name)
    #[serde(default)]
    pub routing_rules: Vec<RoutingRuleSpec>,
}

impl Config {
    /// Load configuration from file, apply environment overrides and validate
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GatewayError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config = Self::from_yaml_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse YAML without touching the environment
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| GatewayError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("BROKER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("BROKER_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("Ignoring invalid BROKER_PORT value: {}", port),
            }
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.storage.database.url = url;
            self.storage.database.enabled = true;
        }
        if let Some(enabled) = lookup("BROKER_CACHE_ENABLED") {
            match enabled.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.broker.caching_enabled = true,
                "0" | "false" | "no" => self.broker.caching_enabled = false,
                other => warn!("Ignoring invalid BROKER_CACHE_ENABLED value: {}", other),
            }
        }
        if let Some(level) = lookup("BROKER_LOG_LEVEL") {
            self.logging.level = level;
        }

        for provider in &mut self.providers {
            provider.api_key = expand_env_placeholders(&provider.api_key, &lookup);
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.server
            .validate()
            .map_err(|e| GatewayError::Config(format!("Server config error: {}", e)))?;
        self.broker
            .validate()
            .map_err(|e| GatewayError::Config(format!("Broker config error: {}", e)))?;
        self.cache
            .validate()
            .map_err(|e| GatewayError::Config(format!("Cache config error: {}", e)))?;
        self.router
            .validate()
            .map_err(|e| GatewayError::Config(format!("Router config error: {}", e)))?;
        self.health
            .validate()
            .map_err(|e| GatewayError::Config(format!("Health config error: {}", e)))?;
        self.storage
            .validate()
            .map_err(|e| GatewayError::Config(format!("Storage config error: {}", e)))?;

        let mut ids = HashSet::new();
        for provider in &self.providers {
            provider.validate().map_err(|e| {
                GatewayError::Config(format!("Provider '{}' config error: {}", provider.id, e))
            })?;
            if !ids.insert(provider.id.as_str()) {
                return Err(GatewayError::Config(format!(
                    "Duplicate provider id: {}",
                    provider.id
                )));
            }
        }

        for provider in &self.providers {
            if let Some(fallback) = &provider.fallback_provider {
                if !ids.contains(fallback.as_str()) {
                    return Err(GatewayError::Config(format!(
                        "Provider '{}' names unknown fallback provider '{}'",
                        provider.id, fallback
                    )));
                }
            }
        }

        let mut rule_names = HashSet::new();
        for rule in &self.routing_rules {
            if rule.name.trim().is_empty() {
                return Err(GatewayError::Config(
                    "Routing rule name cannot be empty".to_string(),
                ));
            }
            if !rule_names.insert(rule.name.as_str()) {
                return Err(GatewayError::Config(format!(
                    "Duplicate routing rule name: {}",
                    rule.name
                )));
            }
            if !ids.contains(rule.target.provider_id.as_str()) {
                warn!(
                    "Routing rule '{}' targets provider '{}' which is not configured in this file",
                    rule.name, rule.target.provider_id
                );
            }
        }

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| GatewayError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}

/// Replace `${NAME}` references with the variable's value.
///
/// Unknown variables expand to an empty string and are reported once.
fn expand_env_placeholders<F>(value: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match lookup(name) {
                    Some(v) => out.push_str(&v),
                    None => warn!("Environment variable {} is not set", name),
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
