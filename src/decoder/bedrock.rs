//! Amazon Bedrock stream decoding (Anthropic models).
//!
//! Bedrock's `invoke-with-response-stream` wraps each Anthropic event in an
//! envelope whose `bytes` field is the base64-encoded event JSON. Decoding
//! unwraps the envelope and delegates to the Anthropic routines. There is no
//! `message_stop`-style sentinel on the outer stream; transport close
//! completes it.

use base64::Engine;
use serde_json::Value;

use crate::types::{Chunk, Vendor};

use super::{unparsed_error, ChunkDecoder};

pub struct BedrockDecoder;

impl ChunkDecoder for BedrockDecoder {
    fn vendor(&self) -> Vendor {
        Vendor::Bedrock
    }

    fn decode_chunk(&self, payload: &Value) -> Chunk {
        match unwrap_envelope(payload) {
            Some(inner) => super::anthropic::decode_event(&inner),
            // Some proxies deliver the event unwrapped.
            None if payload.get("type").is_some() => super::anthropic::decode_event(payload),
            None => Chunk::assistant(),
        }
    }

    fn decode_error(&self, raw: &str) -> (u16, String) {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => {
                let Some(message) = value.get("message").and_then(Value::as_str) else {
                    return super::anthropic::decode_error(raw);
                };
                let code = value
                    .get("statusCode")
                    .and_then(Value::as_u64)
                    .map(|c| c as u16)
                    .unwrap_or(super::UNPARSED_ERROR_CODE);
                (code, message.to_string())
            }
            Err(_) => unparsed_error(raw),
        }
    }

    fn terminates_on_close(&self) -> bool {
        true
    }
}

fn unwrap_envelope(payload: &Value) -> Option<Value> {
    let encoded = payload.get("bytes")?.as_str()?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .ok()?;
    serde_json::from_slice(&decoded).ok()
}
