//! Vendor decoders: one frame payload in, one normalized [`Chunk`] out.
//!
//! Each vendor implements [`ChunkDecoder`] over the same capability set
//! (`decode_chunk`, `decode_error`). The implementation is selected once per
//! session at construction and never re-dispatched per frame.

pub mod registry;

#[cfg(feature = "anthropic")]
pub mod anthropic;
#[cfg(feature = "bedrock")]
pub mod bedrock;
#[cfg(feature = "deepseek")]
pub mod deepseek;
#[cfg(feature = "gemini")]
pub mod gemini;
#[cfg(feature = "openai")]
pub mod openai;

pub use registry::DecoderRegistry;

use serde_json::Value;

use crate::sse::SseFrame;
use crate::types::{Chunk, Vendor};

/// Fallback code when a vendor error envelope cannot be parsed.
pub const UNPARSED_ERROR_CODE: u16 = 500;

/// Capability set shared by all vendor decoders.
pub trait ChunkDecoder: Send + Sync {
    fn vendor(&self) -> Vendor;

    /// Decode one frame's JSON payload into a normalized chunk.
    ///
    /// Total over structurally valid JSON: absent optional fields stay
    /// empty, unrecognized fields are ignored, and an unexpected shape
    /// yields an empty chunk rather than an error.
    fn decode_chunk(&self, payload: &Value) -> Chunk;

    /// Parse the vendor's JSON error envelope into `(code, message)`.
    ///
    /// Never fails: an unparsable payload yields [`UNPARSED_ERROR_CODE`]
    /// with the raw text embedded in the message, so the caller always has
    /// something diagnostic.
    fn decode_error(&self, raw: &str) -> (u16, String);

    /// Whether this frame is the vendor's terminal sentinel. Must not
    /// require JSON parsing; the `[DONE]` marker is already recognized by
    /// the frame splitter.
    fn is_terminal(&self, _frame: &SseFrame) -> bool {
        false
    }

    /// Whether a clean transport close with no sentinel seen completes the
    /// stream for this vendor.
    fn terminates_on_close(&self) -> bool {
        false
    }

    /// Whether this frame carries an in-band error rather than content.
    fn is_error_frame(&self, frame: &SseFrame, payload: &Value) -> bool {
        frame.event.as_deref() == Some("error") || payload.get("error").is_some()
    }
}

/// Shared fallback for unparsable error payloads.
pub(crate) fn unparsed_error(raw: &str) -> (u16, String) {
    (UNPARSED_ERROR_CODE, format!("Failed to parse error: {raw}"))
}
