//! DeepSeek stream decoding.
//!
//! DeepSeek speaks the OpenAI Chat Completions wire format, so decoding
//! delegates to the shared OpenAI routines.

use serde_json::Value;

use crate::types::{Chunk, Vendor};

use super::ChunkDecoder;

pub struct DeepSeekDecoder;

impl ChunkDecoder for DeepSeekDecoder {
    fn vendor(&self) -> Vendor {
        Vendor::DeepSeek
    }

    fn decode_chunk(&self, payload: &Value) -> Chunk {
        super::openai::decode_chunk(payload)
    }

    fn decode_error(&self, raw: &str) -> (u16, String) {
        super::openai::decode_error(raw)
    }
}
