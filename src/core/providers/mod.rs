//! AI provider adapters
//!
//! Each adapter turns a [`BrokerRequest`](crate::core::types::BrokerRequest)
//! into a vendor call. The registry maps provider ids to live adapters.

pub mod openai;
pub mod provider_registry;
pub mod unified_provider;

pub use crate::core::traits::{AiProvider, ChunkCallback};
pub use openai::OpenAIProvider;
pub use provider_registry::ProviderRegistry;
pub use unified_provider::ProviderError;
