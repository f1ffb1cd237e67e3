//! Streaming session orchestration.
//!
//! One session owns one transport connection, one frame splitter, and one
//! accumulator, and drives the state machine
//! `Idle → Connecting → Streaming → Finalizing → {Completed, Failed}`.
//! Terminal states are final.

use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, warn};

use crate::accumulator::MessageAccumulator;
use crate::decoder::ChunkDecoder;
use crate::error::{Result, RivuletError, StreamFailureKind};
use crate::sse::{FrameSplitter, StreamEvent};
use crate::transport::{status_to_error, StreamRequest, StreamResponse, StreamTransport};
use crate::types::{Chunk, Message};

/// Observer invoked once per decoded chunk, synchronously, in frame-arrival
/// order on the session's own control flow. Observers must not block
/// indefinitely: doing so stalls transport consumption.
pub type ChunkObserver = Box<dyn FnMut(&Chunk) + Send>;

/// Lifecycle of one streaming session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Streaming,
    Finalizing,
    Completed,
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

enum Handled {
    Continue,
    Terminal,
}

/// Drives one streaming request to a final [`Message`].
///
/// Abandoning the session (dropping the returned future) closes the
/// transport and discards the in-progress message; partial tool-call state
/// is never surfaced as complete.
pub struct StreamingSession {
    decoder: Arc<dyn ChunkDecoder>,
    transport: Arc<dyn StreamTransport>,
    splitter: FrameSplitter,
    accumulator: MessageAccumulator,
    observer: Option<ChunkObserver>,
    state: SessionState,
}

impl StreamingSession {
    pub fn new(decoder: Arc<dyn ChunkDecoder>, transport: Arc<dyn StreamTransport>) -> Self {
        Self {
            decoder,
            transport,
            splitter: FrameSplitter::new(),
            accumulator: MessageAccumulator::new(),
            observer: None,
            state: SessionState::Idle,
        }
    }

    /// Register an incremental observer, replacing any previous one.
    pub fn with_observer(mut self, observer: impl FnMut(&Chunk) + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the session to completion: open the transport, split frames,
    /// decode chunks, and fold them into the final message. Any failure
    /// discards the in-progress message.
    pub async fn run(&mut self, request: &StreamRequest) -> Result<Message> {
        if self.state != SessionState::Idle {
            return Err(RivuletError::InvalidState(format!(
                "session already ran (state: {:?})",
                self.state
            )));
        }

        match self.drive(request).await {
            Ok(message) => {
                self.state = SessionState::Completed;
                Ok(message)
            }
            Err(err) => {
                self.state = SessionState::Failed;
                Err(err)
            }
        }
    }

    async fn drive(&mut self, request: &StreamRequest) -> Result<Message> {
        self.state = SessionState::Connecting;
        let response = self.transport.open(request).await?;

        if !(200..300).contains(&response.status) {
            return Err(self.classify_http_failure(response).await);
        }

        self.state = SessionState::Streaming;
        debug!(vendor = %self.decoder.vendor(), "stream open");

        let mut bytes = response.bytes;
        let mut saw_terminator = false;

        'read: while let Some(read) = bytes.next().await {
            let fragment = match read {
                Ok(fragment) => fragment,
                Err(err) => {
                    warn!(error = %err, "transport dropped mid-stream");
                    return Err(RivuletError::TransportDrop(err.to_string()));
                }
            };

            for event in self.splitter.push(&fragment) {
                if let Handled::Terminal = self.handle_event(event)? {
                    saw_terminator = true;
                    break 'read;
                }
            }
        }

        if !saw_terminator {
            if let Some(event) = self.splitter.flush() {
                if let Handled::Terminal = self.handle_event(event)? {
                    saw_terminator = true;
                }
            }
        }

        if !saw_terminator && !self.decoder.terminates_on_close() {
            return Err(RivuletError::TransportDrop(
                "connection closed before terminal frame".into(),
            ));
        }

        self.state = SessionState::Finalizing;
        self.accumulator.finish()
    }

    fn handle_event(&mut self, event: StreamEvent) -> Result<Handled> {
        let frame = match event {
            StreamEvent::Done => return Ok(Handled::Terminal),
            StreamEvent::Data(frame) => frame,
        };

        if self.decoder.is_terminal(&frame) {
            return Ok(Handled::Terminal);
        }

        // Invalid JSON never reaches decode_chunk; vendors only send valid
        // JSON on success paths, so route it through decode_error.
        let payload: serde_json::Value = match serde_json::from_str(&frame.data) {
            Ok(payload) => payload,
            Err(_) => {
                let (code, message) = self.decoder.decode_error(&frame.data);
                return Err(RivuletError::stream(
                    StreamFailureKind::MalformedPayload,
                    code,
                    message,
                ));
            }
        };

        if self.decoder.is_error_frame(&frame, &payload) {
            let (code, message) = self.decoder.decode_error(&frame.data);
            return Err(RivuletError::stream(
                StreamFailureKind::InBandError,
                code,
                message,
            ));
        }

        let chunk = self.decoder.decode_chunk(&payload);
        if let Some(ref mut observer) = self.observer {
            observer(&chunk);
        }
        self.accumulator.apply(&chunk)?;
        Ok(Handled::Continue)
    }

    async fn classify_http_failure(&self, response: StreamResponse) -> RivuletError {
        let status = response.status;
        let mut body = String::new();
        let mut bytes = response.bytes;
        while let Some(Ok(fragment)) = bytes.next().await {
            body.push_str(&String::from_utf8_lossy(&fragment));
        }

        debug!(status, "stream request rejected");
        let (_, message) = self.decoder.decode_error(&body);
        status_to_error(status, message, &body)
    }
}
