//! OpenAI Streaming Response Handler
//!
//! Incremental SSE parsing of chat completion streams. Bytes arrive in
//! arbitrary slices, so incomplete lines are buffered until their newline.

use super::error::OpenAIError;
use super::transformer::OpenAIStreamChunk;
use crate::core::types::StreamChunk;
use crate::utils::estimate_tokens;

/// What one SSE `data:` line carried
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Content delta
    Content(String),
    /// Vendor-reported total token usage
    Usage(u32),
    /// `[DONE]` end marker
    Done,
}

/// Line-buffered SSE parser for OpenAI-compatible streams
#[derive(Debug)]
pub struct OpenAISseParser {
    provider: String,
    // Raw bytes; a multi-byte character may be split across reads
    buffer: Vec<u8>,
}

impl OpenAISseParser {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            buffer: Vec::new(),
        }
    }

    /// Process raw bytes into stream events
    pub fn process_bytes(&mut self, bytes: &[u8]) -> Result<Vec<StreamEvent>, OpenAIError> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        if let Some(pos) = self.buffer.iter().rposition(|&b| b == b'\n') {
            let complete: Vec<u8> = self.buffer.drain(..=pos).collect();
            for line in complete.split(|&b| b == b'\n') {
                events.extend(self.process_line(&String::from_utf8_lossy(line))?);
            }
        }
        Ok(events)
    }

    /// Flush a trailing line that never got its newline
    pub fn finish(&mut self) -> Result<Vec<StreamEvent>, OpenAIError> {
        let rest = std::mem::take(&mut self.buffer);
        self.process_line(&String::from_utf8_lossy(&rest))
    }

    fn process_line(&self, line: &str) -> Result<Vec<StreamEvent>, OpenAIError> {
        let line = line.trim_end_matches('\r');
        // Comments, blank separators and non-data fields carry no content
        let Some(data) = line.strip_prefix("data:") else {
            return Ok(Vec::new());
        };
        let data = data.trim();
        if data.is_empty() {
            return Ok(Vec::new());
        }
        if data == "[DONE]" {
            return Ok(vec![StreamEvent::Done]);
        }

        let chunk: OpenAIStreamChunk = serde_json::from_str(data).map_err(|e| {
            OpenAIError::openai_streaming_error(
                &self.provider,
                format!("malformed stream chunk: {}", e),
            )
        })?;

        let mut events = Vec::new();
        for choice in chunk.choices {
            if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
                events.push(StreamEvent::Content(content));
            }
        }
        if let Some(usage) = chunk.usage.filter(|u| u.total_tokens > 0) {
            events.push(StreamEvent::Usage(usage.total_tokens));
        }
        Ok(events)
    }
}

/// Accumulates streamed text and produces the chunks handed to callers
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    content: String,
    reported_tokens: Option<u32>,
    done: bool,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an event; content deltas yield a chunk to forward
    pub fn apply(&mut self, event: StreamEvent) -> Option<StreamChunk> {
        match event {
            StreamEvent::Content(delta) => {
                self.content.push_str(&delta);
                Some(StreamChunk {
                    content: delta,
                    tokens: estimate_tokens(&self.content),
                    finished: false,
                })
            }
            StreamEvent::Usage(tokens) => {
                self.reported_tokens = Some(tokens);
                None
            }
            StreamEvent::Done => {
                self.done = true;
                None
            }
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Vendor usage if reported, else the supplied estimate
    pub fn tokens_or(&self, estimate: u32) -> u32 {
        self.reported_tokens.unwrap_or(estimate)
    }

    /// The closing chunk
    pub fn final_chunk(&self, tokens: u32) -> StreamChunk {
        StreamChunk {
            content: String::new(),
            tokens,
            finished: true,
        }
    }

    pub fn into_content(self) -> String {
        self.content
    }
}
