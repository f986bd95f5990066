//! Health check classification

use crate::core::types::{HealthStatus, ProviderHealthCheck};

/// How a single provider probe ended
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    Completed(ProviderHealthCheck),
    /// The probe did not answer within the timeout (elapsed ms)
    TimedOut(u64),
}

/// Classified result of a probe
#[derive(Debug, Clone, PartialEq)]
pub struct HealthCheckResult {
    pub status: HealthStatus,
    pub response_time_ms: u64,
    pub error: Option<String>,
}

impl HealthCheckResult {
    /// Healthy when the probe passed under the threshold, degraded when it
    /// passed slowly, unhealthy when it failed or timed out
    pub fn classify(outcome: CheckOutcome, degraded_threshold_ms: u64) -> Self {
        match outcome {
            CheckOutcome::Completed(check) if check.healthy => {
                if check.response_time_ms > degraded_threshold_ms {
                    Self {
                        status: HealthStatus::Degraded,
                        response_time_ms: check.response_time_ms,
                        error: Some(format!("High latency: {}ms", check.response_time_ms)),
                    }
                } else {
                    Self {
                        status: HealthStatus::Healthy,
                        response_time_ms: check.response_time_ms,
                        error: None,
                    }
                }
            }
            CheckOutcome::Completed(check) => Self {
                status: HealthStatus::Unhealthy,
                response_time_ms: check.response_time_ms,
                error: Some(
                    check
                        .error
                        .unwrap_or_else(|| "Health check failed".to_string()),
                ),
            },
            CheckOutcome::TimedOut(elapsed) => Self {
                status: HealthStatus::Unhealthy,
                response_time_ms: elapsed,
                error: Some("Health check timeout".to_string()),
            },
        }
    }
}
