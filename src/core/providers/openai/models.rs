//! OpenAI Model Registry
//!
//! Static capability and pricing table for the models served through
//! OpenAI-compatible endpoints.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::core::types::{CapabilityTier, ModelCapabilities, SpeedTier};

/// Registry of known model capabilities
#[derive(Debug, Clone)]
pub struct OpenAIModelRegistry {
    models: HashMap<String, ModelCapabilities>,
}

impl Default for OpenAIModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenAIModelRegistry {
    /// Create registry with the built-in model table
    pub fn new() -> Self {
        let mut registry = Self {
            models: HashMap::new(),
        };
        registry.add_static_models();
        registry
    }

    fn add_static_models(&mut self) {
        // (model, context, vision, speed, capability, input $/1k, output $/1k)
        let table: [(&str, u32, bool, SpeedTier, CapabilityTier, f64, f64); 8] = [
            ("gpt-4o", 128_000, true, SpeedTier::Balanced, CapabilityTier::Advanced, 0.0025, 0.01),
            ("gpt-4o-mini", 128_000, true, SpeedTier::Fast, CapabilityTier::Standard, 0.00015, 0.0006),
            ("gpt-4-turbo", 128_000, true, SpeedTier::Slow, CapabilityTier::Advanced, 0.01, 0.03),
            ("gpt-4", 8_192, false, SpeedTier::Slow, CapabilityTier::Advanced, 0.03, 0.06),
            ("gpt-3.5-turbo", 16_385, false, SpeedTier::Fast, CapabilityTier::Basic, 0.0005, 0.0015),
            ("gpt-4.1", 1_047_576, true, SpeedTier::Balanced, CapabilityTier::Advanced, 0.002, 0.008),
            ("gpt-4.1-mini", 1_047_576, true, SpeedTier::Fast, CapabilityTier::Standard, 0.0004, 0.0016),
            ("gpt-4.1-nano", 1_047_576, false, SpeedTier::Fast, CapabilityTier::Basic, 0.0001, 0.0004),
        ];

        for (model, context_window, vision, speed, capability, input, output) in table {
            self.models.insert(
                model.to_string(),
                ModelCapabilities {
                    model: model.to_string(),
                    context_window,
                    supports_vision: vision,
                    supports_streaming: true,
                    speed,
                    capability,
                    input_cost_per_1k: input,
                    output_cost_per_1k: output,
                },
            );
        }
    }

    /// Capabilities of a known model
    pub fn get(&self, model: &str) -> Option<&ModelCapabilities> {
        self.models.get(model)
    }

    /// Capabilities of any model; unknown models get a conservative profile
    pub fn capabilities(&self, model: &str) -> ModelCapabilities {
        self.get(model).cloned().unwrap_or_else(|| ModelCapabilities {
            model: model.to_string(),
            context_window: 8_192,
            supports_vision: false,
            supports_streaming: true,
            speed: SpeedTier::Balanced,
            capability: CapabilityTier::Standard,
            input_cost_per_1k: 0.001,
            output_cost_per_1k: 0.002,
        })
    }

    /// Average of prompt and completion price per 1000 tokens
    pub fn blended_cost_per_1k(&self, model: &str) -> f64 {
        let caps = self.capabilities(model);
        (caps.input_cost_per_1k + caps.output_cost_per_1k) / 2.0
    }

    pub fn known_models(&self) -> Vec<&str> {
        let mut models: Vec<&str> = self.models.keys().map(String::as_str).collect();
        models.sort_unstable();
        models
    }
}

static OPENAI_REGISTRY: OnceLock<OpenAIModelRegistry> = OnceLock::new();

/// Get the process-wide model registry
pub fn get_openai_registry() -> &'static OpenAIModelRegistry {
    OPENAI_REGISTRY.get_or_init(OpenAIModelRegistry::new)
}
