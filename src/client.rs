//! High-level entry points.

use std::sync::Arc;

use crate::config::RivuletConfig;
use crate::decoder::DecoderRegistry;
use crate::error::{Result, RivuletError};
use crate::session::StreamingSession;
use crate::transport::{HttpTransport, StreamRequest, StreamTransport};
use crate::types::{Chunk, Message, Vendor};

/// Client facade: decoder table, transport, and config bundled together.
///
/// Sessions created from one client are independent; each owns its own
/// splitter and accumulator and may run concurrently with the others.
#[derive(Clone)]
pub struct Rivulet {
    registry: DecoderRegistry,
    transport: Arc<dyn StreamTransport>,
    config: RivuletConfig,
}

impl Default for Rivulet {
    fn default() -> Self {
        Self::new()
    }
}

impl Rivulet {
    /// Built-in decoders, reqwest transport, env-derived config.
    pub fn new() -> Self {
        Self {
            registry: DecoderRegistry::builtin(),
            transport: Arc::new(HttpTransport),
            config: RivuletConfig::from_env(),
        }
    }

    pub fn with_config(mut self, config: RivuletConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn StreamTransport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_registry(mut self, registry: DecoderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &RivuletConfig {
        &self.config
    }

    /// Create a session for one streaming request.
    pub fn session(&self, vendor: Vendor) -> Result<StreamingSession> {
        let decoder = self.registry.get(vendor).ok_or_else(|| {
            RivuletError::Configuration(format!("No decoder registered for vendor '{vendor}'"))
        })?;
        Ok(StreamingSession::new(decoder, self.transport.clone()))
    }

    /// Stream a chat request and fold it into the final message.
    pub async fn stream(
        &self,
        vendor: Vendor,
        model: &str,
        body: serde_json::Value,
    ) -> Result<Message> {
        let request = StreamRequest::chat(vendor, model, body, &self.config)?;
        self.session(vendor)?.run(&request).await
    }

    /// Stream a chat request, invoking `observer` once per chunk before the
    /// final message is returned.
    pub async fn stream_with_observer(
        &self,
        vendor: Vendor,
        model: &str,
        body: serde_json::Value,
        observer: impl FnMut(&Chunk) + Send + 'static,
    ) -> Result<Message> {
        let request = StreamRequest::chat(vendor, model, body, &self.config)?;
        self.session(vendor)?
            .with_observer(observer)
            .run(&request)
            .await
    }
}
