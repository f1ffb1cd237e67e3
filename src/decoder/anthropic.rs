//! Anthropic Messages API stream decoding.
//!
//! Anthropic streams typed events (`message_start`, `content_block_start`,
//! `content_block_delta`, `message_delta`, `message_stop`). Tool-call
//! arguments arrive as `input_json_delta` fragments that concatenate per
//! content-block index.

use serde_json::Value;

use crate::sse::SseFrame;
use crate::types::{Chunk, ToolCallFragment, Vendor};

use super::{unparsed_error, ChunkDecoder};

pub struct AnthropicDecoder;

impl ChunkDecoder for AnthropicDecoder {
    fn vendor(&self) -> Vendor {
        Vendor::Anthropic
    }

    fn decode_chunk(&self, payload: &Value) -> Chunk {
        decode_event(payload)
    }

    fn decode_error(&self, raw: &str) -> (u16, String) {
        decode_error(raw)
    }

    fn is_terminal(&self, frame: &SseFrame) -> bool {
        frame.event.as_deref() == Some("message_stop")
    }
}

/// Decode one Anthropic stream event. Shared with the Bedrock decoder, which
/// wraps the same events in a base64 envelope.
pub(crate) fn decode_event(payload: &Value) -> Chunk {
    let mut chunk = Chunk::assistant();
    let event_type = payload.get("type").and_then(Value::as_str).unwrap_or("");

    match event_type {
        "message_start" => {
            if let Some(message) = payload.get("message") {
                chunk.model_id = message
                    .get("model")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                chunk.input_tokens = token_count(message, "/usage/input_tokens");
                chunk.output_tokens = token_count(message, "/usage/output_tokens");
            }
        }
        "content_block_start" => {
            let index = block_index(payload);
            if let Some(block) = payload.get("content_block") {
                if block.get("type").and_then(Value::as_str) == Some("tool_use") {
                    chunk.tool_calls.push(ToolCallFragment {
                        index,
                        id: block.get("id").and_then(Value::as_str).map(str::to_string),
                        name: block.get("name").and_then(Value::as_str).map(str::to_string),
                        arguments: String::new(),
                    });
                }
            }
        }
        "content_block_delta" => {
            let index = block_index(payload);
            if let Some(delta) = payload.get("delta") {
                match delta.get("type").and_then(Value::as_str).unwrap_or("") {
                    "text_delta" => {
                        if let Some(text) = delta.get("text").and_then(Value::as_str) {
                            chunk.content.push_str(text);
                        }
                    }
                    "input_json_delta" => {
                        if let Some(json) = delta.get("partial_json").and_then(Value::as_str) {
                            chunk.tool_calls.push(ToolCallFragment::arguments(index, json));
                        }
                    }
                    _ => {}
                }
            }
        }
        "message_delta" => {
            // Final usage totals ride on the closing delta.
            chunk.input_tokens = token_count(payload, "/usage/input_tokens");
            chunk.output_tokens = token_count(payload, "/usage/output_tokens");
        }
        _ => {}
    }

    chunk
}

pub(crate) fn decode_error(raw: &str) -> (u16, String) {
    let Ok(value) = serde_json::from_str::<Value>(raw) else {
        return unparsed_error(raw);
    };
    let Some(error) = value.get("error") else {
        return unparsed_error(raw);
    };

    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let code = match error.get("type").and_then(Value::as_str) {
        Some("invalid_request_error") => 400,
        Some("authentication_error") => 401,
        Some("permission_error") => 403,
        Some("not_found_error") => 404,
        Some("rate_limit_error") => 429,
        Some("api_error") => 500,
        Some("overloaded_error") => 529,
        _ => 500,
    };
    (code, message)
}

fn block_index(payload: &Value) -> usize {
    payload.get("index").and_then(Value::as_u64).unwrap_or(0) as usize
}

fn token_count(value: &Value, pointer: &str) -> Option<u32> {
    value.pointer(pointer).and_then(Value::as_u64).map(|n| n as u32)
}
