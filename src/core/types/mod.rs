//! Core type definitions
//!
//! Request/response wire types plus the records the broker stores.

pub mod cache;
pub mod errors;
pub mod health;
pub mod provider;
pub mod request;
pub mod request_log;
pub mod response;
pub mod routing;

pub use cache::*;
pub use errors::*;
pub use health::*;
pub use provider::*;
pub use request::*;
pub use request_log::*;
pub use response::*;
pub use routing::*;
