//! Broker request endpoints

use crate::core::providers::ChunkCallback;
use crate::core::types::{BrokerRequest, BrokerResponse, StreamChunk};
use crate::server::state::AppState;
use actix_web::http::StatusCode;
use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use actix_web::{HttpRequest, HttpResponse, web};
use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, error};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1/broker")
            .route("/requests", web::post().to(process_request))
            .route("/requests/stream", web::post().to(process_stream)),
    );
}

/// A single server-sent event
#[derive(Debug, Clone, Default)]
pub struct SseEvent {
    event: Option<String>,
    data: String,
}

impl SseEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event(mut self, event: &str) -> Self {
        self.event = Some(event.to_string());
        self
    }

    pub fn data(mut self, data: &str) -> Self {
        self.data = data.to_string();
        self
    }

    /// Serialize `value` as the event data
    pub fn json<T: Serialize>(self, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(data) => self.data(&data),
            Err(e) => {
                error!("Failed to serialize SSE payload: {}", e);
                self.data("{}")
            }
        }
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut result = String::new();
        if let Some(event) = &self.event {
            result.push_str(&format!("event: {}\n", event));
        }
        for line in self.data.lines() {
            result.push_str(&format!("data: {}\n", line));
        }
        result.push('\n');
        Bytes::from(result)
    }
}

/// Fill client metadata the caller did not supply
fn with_client_metadata(mut body: Value, req: &HttpRequest) -> Value {
    let ip = req
        .connection_info()
        .realip_remote_addr()
        .map(str::to_string);
    let user_agent = req
        .headers()
        .get(actix_web::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if let Value::Object(obj) = &mut body {
        let metadata = obj
            .entry("metadata")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(metadata) = metadata {
            if let Some(ip) = ip {
                metadata.entry("ip_address").or_insert(Value::String(ip));
            }
            if let Some(user_agent) = user_agent {
                metadata
                    .entry("user_agent")
                    .or_insert(Value::String(user_agent));
            }
        }
    }
    body
}

fn json_response(response: &BrokerResponse) -> HttpResponse {
    let status = response
        .error_code()
        .and_then(|code| StatusCode::from_u16(code.http_status()).ok())
        .unwrap_or(StatusCode::OK);
    HttpResponse::build(status).json(response)
}

/// Process one broker request
pub async fn process_request(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> HttpResponse {
    let body = with_client_metadata(body.into_inner(), &req);
    let response = state.broker.process_json(body).await;
    json_response(&response)
}

/// Process one broker request as a server-sent event stream.
///
/// Emits a `chunk` event per provider chunk and a final `response` event
/// carrying the broker response.
pub async fn process_stream(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> HttpResponse {
    let body = with_client_metadata(body.into_inner(), &req);
    let request: BrokerRequest = match serde_json::from_value(body.clone()) {
        Ok(request) => request,
        Err(_) => {
            let response = state.broker.process_json(body).await;
            return json_response(&response);
        }
    };

    let (tx, rx) = mpsc::unbounded_channel::<StreamChunk>();
    let on_chunk: ChunkCallback = Arc::new(move |chunk| {
        if tx.send(chunk).is_err() {
            debug!("Stream client went away, dropping chunk");
        }
    });

    let broker = state.broker.clone();
    let task = tokio::spawn(async move { broker.process_streaming(&request, on_chunk).await });

    let mut chunks = UnboundedReceiverStream::new(rx);
    let sse_stream = async_stream::stream! {
        while let Some(chunk) = chunks.next().await {
            yield Ok::<_, actix_web::Error>(SseEvent::new().event("chunk").json(&chunk).to_bytes());
        }

        match task.await {
            Ok(response) => {
                yield Ok(SseEvent::new().event("response").json(&response).to_bytes());
            }
            Err(e) => {
                error!("Streaming task failed: {}", e);
                yield Ok(SseEvent::new().event("error").data("streaming task failed").to_bytes());
            }
        }
    };

    HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, "text/event-stream"))
        .insert_header((CACHE_CONTROL, "no-cache"))
        .streaming(sse_stream)
}
