//! Integration tests
//!
//! These tests drive the public API across component boundaries with
//! in-memory collaborators, SQLite, and a mock HTTP vendor.

pub mod broker_tests;
pub mod cache_tests;
pub mod config_tests;
pub mod database_tests;
pub mod health_tests;
pub mod openai_adapter_tests;
