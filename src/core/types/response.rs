//! Broker response types

use super::errors::ErrorCode;
use super::request::RequestKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Successful payload, shaped by request kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    Chat {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        conversation_id: Option<String>,
    },
    Generation {
        content: String,
    },
    Analysis {
        analysis: String,
    },
}

impl ResponseData {
    pub fn for_kind(kind: RequestKind, text: String, conversation_id: Option<String>) -> Self {
        match kind {
            RequestKind::Chat => Self::Chat {
                message: text,
                conversation_id,
            },
            RequestKind::Generation => Self::Generation { content: text },
            RequestKind::Analysis => Self::Analysis { analysis: text },
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Chat { message, .. } => message,
            Self::Generation { content } => content,
            Self::Analysis { analysis } => analysis,
        }
    }
}

/// Structured failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl ResponseError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            retry_after: None,
        }
    }
}

/// How the response was produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
    pub processing_time_ms: u64,
    pub cached: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit_remaining: Option<u32>,
}

/// Result of processing one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerResponse {
    pub id: String,
    pub request_id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
    pub metadata: ResponseMetadata,
    pub timestamp: DateTime<Utc>,
}

impl BrokerResponse {
    pub fn success(
        request_id: impl Into<String>,
        data: ResponseData,
        metadata: ResponseMetadata,
    ) -> Self {
        Self {
            id: crate::utils::generate_id(),
            request_id: request_id.into(),
            success: true,
            data: Some(data),
            error: None,
            metadata,
            timestamp: Utc::now(),
        }
    }

    pub fn failure(
        request_id: impl Into<String>,
        error: ResponseError,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            id: crate::utils::generate_id(),
            request_id: request_id.into(),
            success: false,
            data: None,
            error: Some(error),
            metadata: ResponseMetadata {
                processing_time_ms,
                ..Default::default()
            },
            timestamp: Utc::now(),
        }
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        self.error.as_ref().map(|e| e.code)
    }
}
