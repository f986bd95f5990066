//! # AI Request Broker
//!
//! Accepts abstract AI requests (chat, content generation, analysis), picks
//! a provider and model for each one, answers repeats from a response cache,
//! falls back to alternate providers on failure and logs every request.
//!
//! ## Components
//!
//! - [`core::broker`]: request lifecycle, fallback and logging
//! - [`core::router`]: routing rules and heuristic provider selection
//! - [`core::cache_manager`]: fingerprint-keyed response cache
//! - [`core::providers`]: provider adapters (OpenAI-compatible)
//! - [`core::health`]: background provider health monitor
//! - [`storage`]: in-memory and SeaORM-backed persistence
//! - [`server`]: actix-web HTTP surface
//!
//! ## Example
//!
//! ```rust,no_run
//! use ai_request_broker::{Config, ServerBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/broker.yaml").await?;
//!     let server = ServerBuilder::new().with_config(config).build().await?;
//!     server.start().await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod server;
pub mod services;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use core::broker::{BrokerError, BrokerEvent, BrokerObserver, RequestBroker};
pub use core::cache_manager::ResponseCache;
pub use core::health::HealthMonitor;
pub use core::providers::{AiProvider, OpenAIProvider, ProviderError, ProviderRegistry};
pub use core::router::{ModelRouter, RouterError};
pub use core::types::{BrokerRequest, BrokerResponse, ErrorCode, RequestKind};
pub use server::ServerBuilder;
pub use storage::{BrokerStore, open_store};
pub use utils::error::{GatewayError, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
