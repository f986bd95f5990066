//! Types exchanged with provider adapters

use serde::{Deserialize, Serialize};

/// Text produced by a provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderOutput {
    pub content: String,
    pub tokens_used: u32,
}

/// Incremental piece of a streamed response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamChunk {
    pub content: String,
    /// Running token count so far
    pub tokens: u32,
    pub finished: bool,
}

/// Relative latency class of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedTier {
    Fast,
    Balanced,
    Slow,
}

/// Relative reasoning strength of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityTier {
    Basic,
    Standard,
    Advanced,
}

/// What a model can do and what it costs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCapabilities {
    pub model: String,
    pub context_window: u32,
    pub supports_vision: bool,
    pub supports_streaming: bool,
    pub speed: SpeedTier,
    pub capability: CapabilityTier,
    /// USD per 1000 prompt tokens
    pub input_cost_per_1k: f64,
    /// USD per 1000 completion tokens
    pub output_cost_per_1k: f64,
}

/// Remaining request budget in the current window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitStatus {
    pub limit: u32,
    pub remaining: u32,
    /// Seconds until the oldest request leaves the window
    pub reset_in_secs: u64,
}
