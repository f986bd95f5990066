//! Provider health types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Health status of a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }

    /// Degraded providers still take traffic
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unhealthy)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HealthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "healthy" => Ok(Self::Healthy),
            "degraded" => Ok(Self::Degraded),
            "unhealthy" => Ok(Self::Unhealthy),
            other => Err(format!("unknown health status '{}'", other)),
        }
    }
}

/// One probe result, appended to the health history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderHealthRecord {
    pub provider_id: String,
    pub status: HealthStatus,
    pub checked_at: DateTime<Utc>,
    pub response_time_ms: u64,
    pub error_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit_remaining: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of an adapter's own health probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderHealthCheck {
    pub healthy: bool,
    pub response_time_ms: u64,
    pub error: Option<String>,
}
