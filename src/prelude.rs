//! Convenience re-exports for common use.

pub use crate::accumulator::MessageAccumulator;
pub use crate::client::Rivulet;
pub use crate::config::RivuletConfig;
pub use crate::decoder::{ChunkDecoder, DecoderRegistry};
pub use crate::error::{Result, RivuletError, StreamFailureKind};
pub use crate::session::{SessionState, StreamingSession};
pub use crate::transport::{HttpTransport, StreamRequest, StreamTransport};
pub use crate::types::{Chunk, Message, Role, ToolCall, ToolCallFragment, Vendor};
