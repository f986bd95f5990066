//! Core traits module
//!
//! Abstract interfaces shared between the broker and its adapters

pub mod provider;

pub use provider::{AiProvider, ChunkCallback};
