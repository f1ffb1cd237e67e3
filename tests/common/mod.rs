//! Shared test support: a scripted in-memory transport.

use async_trait::async_trait;

use rivulet::error::{Result, RivuletError};
use rivulet::transport::{StreamRequest, StreamResponse, StreamTransport};

/// One scripted transport read.
#[derive(Clone)]
pub enum Read {
    Bytes(Vec<u8>),
    Drop(String),
    /// Never resolves; the stream hangs here until the caller gives up.
    Stall,
}

/// Replays a fixed sequence of reads for every `open` call.
pub struct ScriptedTransport {
    status: u16,
    reads: Vec<Read>,
}

impl ScriptedTransport {
    pub fn ok(reads: Vec<Read>) -> Self {
        Self { status: 200, reads }
    }

    pub fn with_status(status: u16, body: &str) -> Self {
        Self {
            status,
            reads: vec![Read::Bytes(body.as_bytes().to_vec())],
        }
    }
}

#[async_trait]
impl StreamTransport for ScriptedTransport {
    async fn open(&self, _request: &StreamRequest) -> Result<StreamResponse> {
        let reads = self.reads.clone();
        let bytes = async_stream::stream! {
            for read in reads {
                match read {
                    Read::Bytes(fragment) => yield Ok(fragment),
                    Read::Drop(message) => {
                        yield Err(RivuletError::TransportDrop(message));
                        break;
                    }
                    Read::Stall => futures::future::pending::<()>().await,
                }
            }
        };
        Ok(StreamResponse {
            status: self.status,
            bytes: Box::pin(bytes),
        })
    }
}

/// A `data:`-only SSE frame as one read.
pub fn sse(data: &str) -> Read {
    Read::Bytes(format!("data: {data}\n\n").into_bytes())
}

/// An SSE frame with an event name as one read.
pub fn sse_event(event: &str, data: &str) -> Read {
    Read::Bytes(format!("event: {event}\ndata: {data}\n\n").into_bytes())
}

/// Request stub for sessions driven by a scripted transport.
pub fn dummy_request() -> StreamRequest {
    StreamRequest {
        url: "http://scripted.test/v1/stream".into(),
        headers: reqwest::header::HeaderMap::new(),
        body: serde_json::json!({}),
    }
}
