//! Rivulet — vendor-neutral streaming for LLM chat APIs.
//!
//! Normalizes the live event streams of OpenAI, Anthropic, Gemini, DeepSeek,
//! and Bedrock into one ordered sequence of [`types::Chunk`] values, folded
//! into a single final [`types::Message`] that is indistinguishable from a
//! non-streamed response.
//!
//! # Quick Start
//!
//! ```no_run
//! use rivulet::prelude::*;
//!
//! # async fn example() -> rivulet::error::Result<()> {
//! let client = Rivulet::new();
//! let message = client
//!     .stream_with_observer(
//!         Vendor::OpenAi,
//!         "gpt-4o",
//!         serde_json::json!({"messages": [{"role": "user", "content": "Hello!"}]}),
//!         |chunk| print!("{}", chunk.content),
//!     )
//!     .await?;
//! println!("\n({:?} output tokens)", message.output_tokens);
//! # Ok(())
//! # }
//! ```

pub mod accumulator;
pub mod client;
pub mod config;
pub mod decoder;
pub mod error;
pub mod prelude;
pub mod session;
pub mod sse;
pub mod transport;
pub mod types;

pub use client::Rivulet;
