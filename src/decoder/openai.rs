//! OpenAI Chat Completions stream decoding.

use serde::Deserialize;
use serde_json::Value;

use crate::types::{Chunk, ToolCallFragment, Vendor};

use super::{unparsed_error, ChunkDecoder};

pub struct OpenAiDecoder;

impl ChunkDecoder for OpenAiDecoder {
    fn vendor(&self) -> Vendor {
        Vendor::OpenAi
    }

    fn decode_chunk(&self, payload: &Value) -> Chunk {
        decode_chunk(payload)
    }

    fn decode_error(&self, raw: &str) -> (u16, String) {
        decode_error(raw)
    }
}

/// Decode an OpenAI-shaped stream chunk. Shared with the DeepSeek decoder,
/// whose wire format is identical.
pub(crate) fn decode_chunk(payload: &Value) -> Chunk {
    let parsed = StreamChunk::deserialize(payload).unwrap_or_default();

    let mut chunk = Chunk::assistant();
    chunk.model_id = parsed.model;

    if let Some(choice) = parsed.choices.into_iter().next() {
        chunk.content = choice.delta.content.unwrap_or_default();
        for tc in choice.delta.tool_calls.unwrap_or_default() {
            chunk.tool_calls.push(ToolCallFragment {
                index: tc.index,
                id: tc.id,
                name: tc.function.name,
                arguments: tc.function.arguments.unwrap_or_default(),
            });
        }
    }

    // Usage arrives only on the final frame (stream_options.include_usage).
    if let Some(usage) = parsed.usage {
        chunk.input_tokens = Some(usage.prompt_tokens);
        chunk.output_tokens = Some(usage.completion_tokens);
    }

    chunk
}

pub(crate) fn decode_error(raw: &str) -> (u16, String) {
    match serde_json::from_str::<ErrorEnvelope>(raw) {
        Ok(envelope) => {
            let code = envelope
                .error
                .code
                .as_ref()
                .and_then(Value::as_u64)
                .map(|c| c as u16)
                .unwrap_or(super::UNPARSED_ERROR_CODE);
            (code, envelope.error.message)
        }
        Err(_) => unparsed_error(raw),
    }
}

// Wire types (internal)

#[derive(Deserialize, Default)]
struct StreamChunk {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    usage: Option<StreamUsage>,
}

#[derive(Deserialize, Default)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Deserialize, Default)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallDelta>>,
}

#[derive(Deserialize, Default)]
struct ToolCallDelta {
    #[serde(default)]
    index: usize,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: FunctionDelta,
}

#[derive(Deserialize, Default)]
struct FunctionDelta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

#[derive(Deserialize)]
struct StreamUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    message: String,
}
