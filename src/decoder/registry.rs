//! Explicit vendor-to-decoder table.
//!
//! Decoders are registered once and selected by vendor at session
//! construction. The table is an ordinary value passed into the client, not
//! process-wide mutable state.

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::Vendor;

use super::ChunkDecoder;

#[derive(Clone, Default)]
pub struct DecoderRegistry {
    decoders: HashMap<Vendor, Arc<dyn ChunkDecoder>>,
}

impl DecoderRegistry {
    /// Empty table for callers that register their own decoders.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Table seeded with every built-in vendor decoder.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        #[cfg(feature = "openai")]
        registry.register(Arc::new(super::openai::OpenAiDecoder));
        #[cfg(feature = "anthropic")]
        registry.register(Arc::new(super::anthropic::AnthropicDecoder));
        #[cfg(feature = "gemini")]
        registry.register(Arc::new(super::gemini::GeminiDecoder));
        #[cfg(feature = "deepseek")]
        registry.register(Arc::new(super::deepseek::DeepSeekDecoder));
        #[cfg(feature = "bedrock")]
        registry.register(Arc::new(super::bedrock::BedrockDecoder));
        registry
    }

    /// Register (or replace) the decoder for its vendor.
    pub fn register(&mut self, decoder: Arc<dyn ChunkDecoder>) {
        self.decoders.insert(decoder.vendor(), decoder);
    }

    pub fn get(&self, vendor: Vendor) -> Option<Arc<dyn ChunkDecoder>> {
        self.decoders.get(&vendor).cloned()
    }

    pub fn vendors(&self) -> Vec<Vendor> {
        self.decoders.keys().copied().collect()
    }
}
