//! Broker request types
//!
//! On the wire a request is a flat JSON object whose `type` field selects how
//! the free-form `parameters` map is read. In memory the parameters are a
//! tagged union so each request kind carries only the fields it understands;
//! keys the broker does not know about are preserved in `extra`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Kind of AI work being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Chat,
    Generation,
    Analysis,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Generation => "generation",
            Self::Analysis => "analysis",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(Self::Chat),
            "generation" => Ok(Self::Generation),
            "analysis" => Ok(Self::Analysis),
            other => Err(format!("unknown request type '{}'", other)),
        }
    }
}

/// Caller-declared urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl RequestPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

/// One prior turn of a chat conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: String,
    pub content: String,
}

impl HistoryMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Parameters of a chat request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoryMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_time: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multimodal: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_data: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_specific: Option<bool>,
    /// Keys not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parameters of a content generation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objectives: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_time: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multimodal: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_data: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_specific: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parameters of an analysis request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_time: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multimodal: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_data: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_specific: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Kind-specific request parameters
#[derive(Debug, Clone, PartialEq)]
pub enum RequestParameters {
    Chat(ChatParams),
    Generation(GenerationParams),
    Analysis(AnalysisParams),
}

impl RequestParameters {
    /// Read a raw parameter map according to the request kind
    pub fn from_map(kind: RequestKind, map: Map<String, Value>) -> serde_json::Result<Self> {
        let value = Value::Object(map);
        Ok(match kind {
            RequestKind::Chat => Self::Chat(serde_json::from_value(value)?),
            RequestKind::Generation => Self::Generation(serde_json::from_value(value)?),
            RequestKind::Analysis => Self::Analysis(serde_json::from_value(value)?),
        })
    }

    /// Serialize back into the free-form wire map
    pub fn to_map(&self) -> Map<String, Value> {
        let value = match self {
            Self::Chat(p) => serde_json::to_value(p),
            Self::Generation(p) => serde_json::to_value(p),
            Self::Analysis(p) => serde_json::to_value(p),
        };
        match value {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Chat(_) => RequestKind::Chat,
            Self::Generation(_) => RequestKind::Generation,
            Self::Analysis(_) => RequestKind::Analysis,
        }
    }

    /// True when no parameter at all was supplied
    pub fn is_empty(&self) -> bool {
        self.to_map().is_empty()
    }

    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::Chat(p) => p.subject.as_deref(),
            Self::Generation(p) => p.subject.as_deref(),
            Self::Analysis(p) => p.subject.as_deref(),
        }
        .filter(|s| !s.trim().is_empty())
    }

    pub fn difficulty(&self) -> Option<&str> {
        match self {
            Self::Chat(p) => p.difficulty.as_deref(),
            Self::Generation(p) => p.difficulty.as_deref(),
            Self::Analysis(p) => p.difficulty.as_deref(),
        }
    }

    pub fn is_real_time(&self) -> bool {
        match self {
            Self::Chat(p) => p.real_time,
            Self::Generation(p) => p.real_time,
            Self::Analysis(p) => p.real_time,
        }
        .unwrap_or(false)
    }

    /// Multimodal when flagged or when images are attached
    pub fn is_multimodal(&self) -> bool {
        let (flag, images) = match self {
            Self::Chat(p) => (p.multimodal, &p.images),
            Self::Generation(p) => (p.multimodal, &p.images),
            Self::Analysis(p) => (p.multimodal, &p.images),
        };
        flag.unwrap_or(false) || !images.is_empty()
    }

    /// Whether the request carries personal or user-specific data
    pub fn has_personal_markers(&self) -> bool {
        let (personal, user_specific) = match self {
            Self::Chat(p) => (p.personal_data, p.user_specific),
            Self::Generation(p) => (p.personal_data, p.user_specific),
            Self::Analysis(p) => (p.personal_data, p.user_specific),
        };
        personal.unwrap_or(false) || user_specific.unwrap_or(false)
    }

    pub fn custom_instructions(&self) -> Option<&str> {
        match self {
            Self::Generation(p) => p.custom_instructions.as_deref(),
            _ => None,
        }
    }

    pub fn material_type(&self) -> Option<&str> {
        match self {
            Self::Generation(p) => p.material_type.as_deref(),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Chat(p) => p.message.as_deref(),
            Self::Analysis(p) => p.message.as_deref(),
            Self::Generation(_) => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Generation(p) => p.description.as_deref(),
            Self::Analysis(p) => p.description.as_deref(),
            Self::Chat(_) => None,
        }
    }

    /// All free text the provider will see, used for token estimates
    pub fn prompt_text(&self) -> String {
        let parts: Vec<&str> = match self {
            Self::Chat(p) => {
                let mut parts: Vec<&str> = p.history.iter().map(|m| m.content.as_str()).collect();
                parts.extend(p.system_prompt.as_deref());
                parts.extend(p.message.as_deref());
                parts
            }
            Self::Generation(p) => {
                let mut parts: Vec<&str> = [
                    p.topic.as_deref(),
                    p.description.as_deref(),
                    p.custom_instructions.as_deref(),
                    p.prompt.as_deref(),
                    p.system_prompt.as_deref(),
                ]
                .into_iter()
                .flatten()
                .collect();
                parts.extend(p.objectives.iter().map(String::as_str));
                parts
            }
            Self::Analysis(p) => [
                p.content.as_deref(),
                p.description.as_deref(),
                p.message.as_deref(),
            ]
            .into_iter()
            .flatten()
            .collect(),
        };
        parts.join("\n")
    }
}

/// Request metadata captured at the edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestMetadata {
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_role: Option<String>,
}

impl Default for RequestMetadata {
    fn default() -> Self {
        Self {
            timestamp: Utc::now(),
            ip_address: None,
            user_agent: None,
            session_id: None,
            user_role: None,
        }
    }
}

/// Per-request caching directives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachingOptions {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,
}

impl Default for CachingOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: None,
            cache_key: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// A single AI request submitted to the broker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BrokerRequestWire", into = "BrokerRequestWire")]
pub struct BrokerRequest {
    pub id: String,
    pub user_id: String,
    pub conversation_id: Option<String>,
    pub model_preference: Option<String>,
    pub priority: RequestPriority,
    pub parameters: RequestParameters,
    pub metadata: RequestMetadata,
    pub caching: Option<CachingOptions>,
}

impl BrokerRequest {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        parameters: RequestParameters,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            conversation_id: None,
            model_preference: None,
            priority: RequestPriority::Normal,
            parameters,
            metadata: RequestMetadata::default(),
            caching: None,
        }
    }

    pub fn chat(id: impl Into<String>, user_id: impl Into<String>, params: ChatParams) -> Self {
        Self::new(id, user_id, RequestParameters::Chat(params))
    }

    pub fn generation(
        id: impl Into<String>,
        user_id: impl Into<String>,
        params: GenerationParams,
    ) -> Self {
        Self::new(id, user_id, RequestParameters::Generation(params))
    }

    pub fn analysis(
        id: impl Into<String>,
        user_id: impl Into<String>,
        params: AnalysisParams,
    ) -> Self {
        Self::new(id, user_id, RequestParameters::Analysis(params))
    }

    pub fn with_priority(mut self, priority: RequestPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_model_preference(mut self, model: impl Into<String>) -> Self {
        self.model_preference = Some(model.into());
        self
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_caching(mut self, caching: CachingOptions) -> Self {
        self.caching = Some(caching);
        self
    }

    pub fn with_user_role(mut self, role: impl Into<String>) -> Self {
        self.metadata.user_role = Some(role.into());
        self
    }

    pub fn kind(&self) -> RequestKind {
        self.parameters.kind()
    }

    /// Caching is on unless the caller turned it off
    pub fn caching_enabled(&self) -> bool {
        self.caching.as_ref().map(|c| c.enabled).unwrap_or(true)
    }

    pub fn custom_ttl(&self) -> Option<u64> {
        self.caching.as_ref().and_then(|c| c.ttl_seconds)
    }

    pub fn cache_key(&self) -> Option<&str> {
        self.caching
            .as_ref()
            .and_then(|c| c.cache_key.as_deref())
            .filter(|k| !k.is_empty())
    }
}

/// Flat JSON shape of a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerRequestWire {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RequestKind,
    #[serde(default)]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_preference: Option<String>,
    #[serde(default)]
    pub priority: RequestPriority,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub metadata: RequestMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caching: Option<CachingOptions>,
}

impl TryFrom<BrokerRequestWire> for BrokerRequest {
    type Error = String;

    fn try_from(wire: BrokerRequestWire) -> Result<Self, Self::Error> {
        let parameters = RequestParameters::from_map(wire.kind, wire.parameters)
            .map_err(|e| format!("invalid {} parameters: {}", wire.kind, e))?;

        Ok(Self {
            id: wire.id,
            user_id: wire.user_id,
            conversation_id: wire.conversation_id,
            model_preference: wire.model_preference,
            priority: wire.priority,
            parameters,
            metadata: wire.metadata,
            caching: wire.caching,
        })
    }
}

impl From<BrokerRequest> for BrokerRequestWire {
    fn from(request: BrokerRequest) -> Self {
        Self {
            kind: request.kind(),
            parameters: request.parameters.to_map(),
            id: request.id,
            user_id: request.user_id,
            conversation_id: request.conversation_id,
            model_preference: request.model_preference,
            priority: request.priority,
            metadata: request.metadata,
            caching: request.caching,
        }
    }
}
