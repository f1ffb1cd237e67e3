//! Google Gemini stream decoding.
//!
//! Gemini sends whole `GenerateContentResponse` objects per frame and has no
//! in-band terminal sentinel; a clean transport close completes the stream.

use serde::Deserialize;
use serde_json::Value;

use crate::types::{Chunk, ToolCallFragment, Vendor};

use super::{unparsed_error, ChunkDecoder};

pub struct GeminiDecoder;

impl ChunkDecoder for GeminiDecoder {
    fn vendor(&self) -> Vendor {
        Vendor::Gemini
    }

    fn decode_chunk(&self, payload: &Value) -> Chunk {
        let parsed = GeminiStreamChunk::deserialize(payload).unwrap_or_default();

        let mut chunk = Chunk::assistant();
        chunk.model_id = parsed.model_version;

        // Only the first candidate is meaningful; text-flagged parts are
        // concatenated in listed order with no separator.
        if let Some(candidate) = parsed.candidates.into_iter().next() {
            let mut call_index = 0;
            for part in candidate.content.parts {
                if let Some(text) = part.text {
                    chunk.content.push_str(&text);
                }
                if let Some(fc) = part.function_call {
                    chunk.tool_calls.push(ToolCallFragment {
                        index: call_index,
                        id: Some(uuid::Uuid::new_v4().to_string()),
                        name: Some(fc.name),
                        arguments: fc
                            .args
                            .map(|args| args.to_string())
                            .unwrap_or_else(|| "{}".to_string()),
                    });
                    call_index += 1;
                }
            }
        }

        if let Some(usage) = parsed.usage_metadata {
            chunk.input_tokens = usage.prompt_token_count;
            chunk.output_tokens = usage.candidates_token_count;
        }

        chunk
    }

    fn decode_error(&self, raw: &str) -> (u16, String) {
        match serde_json::from_str::<GeminiErrorEnvelope>(raw) {
            Ok(envelope) => (envelope.error.code, envelope.error.message),
            Err(_) => unparsed_error(raw),
        }
    }

    fn terminates_on_close(&self) -> bool {
        true
    }
}

// Wire types (internal)

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiStreamChunk {
    #[serde(default)]
    model_version: Option<String>,
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Deserialize, Default)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
}

#[derive(Deserialize, Default)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    function_call: Option<GeminiFunctionCall>,
}

#[derive(Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: Option<Value>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
}

#[derive(Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    code: u16,
    #[serde(default)]
    message: String,
}
