//! Error handling for the broker
//!
//! Infrastructure-level errors (configuration, storage, serialization) share
//! a single error type. Provider and routing failures have their own enums in
//! `core` and are translated into response error codes by the broker.

#![allow(missing_docs)]

mod helpers;
mod response;
mod types;

pub use response::{ErrorDetail, ErrorResponse};
pub use types::{GatewayError, Result};
