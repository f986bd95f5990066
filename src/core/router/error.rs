//! Router error types

/// Router error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    /// No enabled, non-unhealthy provider could take the request
    #[error("No providers available: {0}")]
    NoProvidersAvailable(String),
}
