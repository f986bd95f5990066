//! Provider Registry
//!
//! Maps provider ids to the adapters that serve them.

use super::AiProvider;
use super::openai::{OpenAIConfig, OpenAIProvider};
use super::unified_provider::ProviderError;
use crate::config::ProviderConfig;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Registered provider adapters, keyed by provider id
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: DashMap<String, Arc<dyn AiProvider>>,
}

impl ProviderRegistry {
    /// Create new provider registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build adapters for every enabled provider configuration
    pub fn from_configs(configs: &[ProviderConfig]) -> Result<Self, ProviderError> {
        let registry = Self::new();
        for config in configs {
            if !config.enabled {
                info!("Provider {} is disabled, not registering", config.id);
                continue;
            }
            match config.provider_type.as_str() {
                "openai" => {
                    let provider = OpenAIProvider::new(OpenAIConfig::from_provider_config(config))?;
                    registry.register(Arc::new(provider));
                }
                other => {
                    warn!(
                        "Provider {} has unsupported type {}, skipping",
                        config.id, other
                    );
                }
            }
        }
        Ok(registry)
    }

    /// Register a provider, replacing any adapter with the same id
    pub fn register(&self, provider: Arc<dyn AiProvider>) {
        info!("Registering provider adapter: {}", provider.id());
        self.providers.insert(provider.id().to_string(), provider);
    }

    /// Get provider by id
    pub fn get(&self, id: &str) -> Option<Arc<dyn AiProvider>> {
        self.providers.get(id).map(|p| Arc::clone(p.value()))
    }

    /// Remove provider
    pub fn remove(&self, id: &str) -> Option<Arc<dyn AiProvider>> {
        self.providers.remove(id).map(|(_, p)| p)
    }

    /// Check if provider is registered
    pub fn contains(&self, id: &str) -> bool {
        self.providers.contains_key(id)
    }

    /// Registered provider ids, sorted
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.providers.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// All registered adapters, sorted by id
    pub fn all(&self) -> Vec<Arc<dyn AiProvider>> {
        let mut providers: Vec<Arc<dyn AiProvider>> =
            self.providers.iter().map(|e| Arc::clone(e.value())).collect();
        providers.sort_by(|a, b| a.id().cmp(b.id()));
        providers
    }

    /// Get provider count
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
