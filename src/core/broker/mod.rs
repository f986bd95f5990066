//! Request broker
//!
//! Validates requests, consults the response cache, routes to a provider,
//! falls back to alternates on failure and logs every request.

#[allow(clippy::module_inception)]
pub mod broker;
pub mod error;
pub mod events;
pub mod validation;


pub use broker::RequestBroker;
pub use error::BrokerError;
pub use events::{BroadcastObserver, BrokerEvent, BrokerObserver, NoopObserver, TracingObserver};
pub use validation::validate_request;
