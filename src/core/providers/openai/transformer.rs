//! OpenAI request and response shapes
//!
//! Turns broker requests into chat completion payloads and reads the
//! vendor's responses back out.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::error::OpenAIError;
use crate::core::types::{
    AnalysisParams, BrokerRequest, ChatParams, GenerationParams, RequestParameters,
};
use crate::utils::estimate_tokens;

/// One message of a chat completion payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAIMessage {
    pub role: String,
    /// Plain string, or an array of content parts for vision input
    pub content: Value,
}

impl OpenAIMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Value::String(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Value::String(content.into()),
        }
    }

    /// User message with attached image URLs
    pub fn user_with_images(text: impl Into<String>, images: &[String]) -> Self {
        if images.is_empty() {
            return Self::user(text);
        }
        let mut parts = vec![json!({"type": "text", "text": text.into()})];
        parts.extend(
            images
                .iter()
                .map(|url| json!({"type": "image_url", "image_url": {"url": url}})),
        );
        Self {
            role: "user".to_string(),
            content: Value::Array(parts),
        }
    }

    /// Textual content, ignoring image parts
    pub fn text(&self) -> String {
        match &self.content {
            Value::String(s) => s.clone(),
            Value::Array(parts) => parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("\n"),
            _ => String::new(),
        }
    }
}

/// Chat completion request body
#[derive(Debug, Clone, Serialize)]
pub struct OpenAIChatRequest {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIUsage {
    #[serde(default)]
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Chat completion response body
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIChatResponse {
    #[serde(default)]
    pub choices: Vec<OpenAIChoice>,
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAIDelta {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIStreamChoice {
    #[serde(default)]
    pub delta: OpenAIDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// One `data:` payload of a streamed completion
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIStreamChunk {
    #[serde(default)]
    pub choices: Vec<OpenAIStreamChoice>,
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
}

/// Builds chat completion payloads from broker requests
pub struct OpenAIRequestTransformer;

impl OpenAIRequestTransformer {
    /// Build the full request body
    pub fn transform(request: &BrokerRequest, model: &str, stream: bool) -> OpenAIChatRequest {
        let (temperature, max_tokens) = match &request.parameters {
            RequestParameters::Chat(_) => (0.7, 1_000),
            RequestParameters::Generation(_) => (0.7, 4_000),
            RequestParameters::Analysis(_) => (0.3, 2_000),
        };
        OpenAIChatRequest {
            model: model.to_string(),
            messages: Self::messages(request),
            temperature: Some(temperature),
            max_tokens: Some(max_tokens),
            stream,
            stream_options: stream.then(|| json!({"include_usage": true})),
        }
    }

    /// Messages for a request of any kind
    pub fn messages(request: &BrokerRequest) -> Vec<OpenAIMessage> {
        match &request.parameters {
            RequestParameters::Chat(p) => chat_messages(p),
            RequestParameters::Generation(p) => generation_messages(p),
            RequestParameters::Analysis(p) => analysis_messages(p),
        }
    }
}

fn chat_messages(params: &ChatParams) -> Vec<OpenAIMessage> {
    let mut messages = Vec::with_capacity(params.history.len() + 2);
    if let Some(system) = non_blank(params.system_prompt.as_deref()) {
        messages.push(OpenAIMessage::system(system));
    }
    for entry in &params.history {
        messages.push(OpenAIMessage {
            role: entry.role.clone(),
            content: Value::String(entry.content.clone()),
        });
    }
    messages.push(OpenAIMessage::user_with_images(
        params.message.clone().unwrap_or_default(),
        &params.images,
    ));
    messages
}

fn generation_messages(params: &GenerationParams) -> Vec<OpenAIMessage> {
    let system = match non_blank(params.system_prompt.as_deref()) {
        Some(system) => system.to_string(),
        None => generation_system_prompt(params),
    };
    let user = match non_blank(params.prompt.as_deref()) {
        Some(prompt) => prompt.to_string(),
        None => generation_user_prompt(params),
    };
    vec![
        OpenAIMessage::system(system),
        OpenAIMessage::user_with_images(user, &params.images),
    ]
}

fn generation_system_prompt(params: &GenerationParams) -> String {
    let mut prompt = String::from(
        "You are an expert educational content creator. Produce accurate, well structured \
         material that is ready to use in a classroom.",
    );
    let details = [
        ("Subject", params.subject.as_deref()),
        ("Material type", params.material_type.as_deref()),
        ("Difficulty", params.difficulty.as_deref()),
        ("Target audience", params.target_audience.as_deref()),
    ];
    for (label, value) in details {
        if let Some(value) = non_blank(value) {
            prompt.push_str(&format!("\n{}: {}", label, value));
        }
    }
    if let Some(custom) = non_blank(params.custom_instructions.as_deref()) {
        prompt.push_str("\n\nAdditional instructions:\n");
        prompt.push_str(custom);
    }
    prompt
}

fn generation_user_prompt(params: &GenerationParams) -> String {
    let material = non_blank(params.material_type.as_deref()).unwrap_or("educational material");
    let mut prompt = match non_blank(params.topic.as_deref()) {
        Some(topic) => format!("Create {} about: {}", material.replace('_', " "), topic),
        None => format!("Create {}.", material.replace('_', " ")),
    };
    if let Some(description) = non_blank(params.description.as_deref()) {
        prompt.push_str("\n\n");
        prompt.push_str(description);
    }
    if !params.objectives.is_empty() {
        prompt.push_str("\n\nLearning objectives:");
        for objective in &params.objectives {
            prompt.push_str("\n- ");
            prompt.push_str(objective);
        }
    }
    prompt
}

fn analysis_messages(params: &AnalysisParams) -> Vec<OpenAIMessage> {
    let mut system = String::from(
        "You are an expert educational analyst. Provide a clear, structured analysis with \
         concrete observations and actionable recommendations.",
    );
    if let Some(kind) = non_blank(params.analysis_type.as_deref()) {
        system.push_str(&format!("\nAnalysis type: {}", kind));
    }
    if let Some(subject) = non_blank(params.subject.as_deref()) {
        system.push_str(&format!("\nSubject: {}", subject));
    }

    let mut user = params.content.clone().unwrap_or_default();
    for extra in [params.description.as_deref(), params.message.as_deref()] {
        if let Some(extra) = non_blank(extra) {
            user.push_str("\n\n");
            user.push_str(extra);
        }
    }
    vec![
        OpenAIMessage::system(system),
        OpenAIMessage::user_with_images(user, &params.images),
    ]
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Reads vendor responses
pub struct OpenAIResponseTransformer;

impl OpenAIResponseTransformer {
    /// Text and token count of a completion
    pub fn transform(
        provider: &str,
        response: OpenAIChatResponse,
        messages: &[OpenAIMessage],
    ) -> Result<(String, u32), OpenAIError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| {
                OpenAIError::openai_response_parsing(provider, "response has no choices")
            })?;
        let content = choice.message.content.unwrap_or_default();
        let tokens = match response.usage {
            Some(usage) if usage.total_tokens > 0 => usage.total_tokens,
            _ => estimate_call_tokens(messages, &content),
        };
        Ok((content, tokens))
    }
}

/// Estimate prompt plus completion tokens when the vendor reports none
pub fn estimate_call_tokens(messages: &[OpenAIMessage], completion: &str) -> u32 {
    let prompt: String = messages
        .iter()
        .map(OpenAIMessage::text)
        .collect::<Vec<_>>()
        .join("\n");
    estimate_tokens(&prompt) + estimate_tokens(completion)
}
