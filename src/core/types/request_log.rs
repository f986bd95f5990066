//! Request log records

use super::errors::ErrorCode;
use super::request::{RequestKind, RequestPriority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One provider invocation made while serving a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderAttempt {
    pub provider_id: String,
    pub model: String,
    pub response_time_ms: u64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The row written for every request the broker handles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestLogRecord {
    pub id: String,
    pub request_id: String,
    pub user_id: String,
    pub conversation_id: Option<String>,
    pub kind: Option<RequestKind>,
    pub priority: RequestPriority,
    pub provider_id: Option<String>,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
    pub cost: Option<f64>,
    pub processing_time_ms: u64,
    pub cached: bool,
    pub streaming: bool,
    pub success: bool,
    pub error_code: Option<ErrorCode>,
    pub error_message: Option<String>,
    pub attempts: Vec<ProviderAttempt>,
    pub created_at: DateTime<Utc>,
}
