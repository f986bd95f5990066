//! OpenAI-compatible provider
//!
//! Chat completions (plain and streamed), health probing, local rate
//! limiting and cost estimation for any endpoint that speaks the OpenAI API.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod provider;
pub mod streaming;
pub mod transformer;

pub use client::OpenAIClient;
pub use config::OpenAIConfig;
pub use error::OpenAIError;
pub use models::{OpenAIModelRegistry, get_openai_registry};
pub use provider::OpenAIProvider;
