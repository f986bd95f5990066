/// Provider entity module
pub mod provider;
/// Provider health history entity module
pub mod provider_health;
/// Request log entity module
pub mod request_log;
/// Response cache entity module
pub mod response_cache;
/// Routing rule entity module
pub mod routing_rule;

pub use provider::Entity as Provider;
pub use provider_health::Entity as ProviderHealth;
pub use request_log::Entity as RequestLog;
pub use response_cache::Entity as ResponseCache;
pub use routing_rule::Entity as RoutingRule;
