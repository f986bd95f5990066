//! Services module
//!
//! Administrative operations that sit beside the request path.

pub mod routing_rules;

pub use routing_rules::RoutingRuleService;
