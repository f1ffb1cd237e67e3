//! Vendor-neutral data model: chunks, messages, and vendor identifiers.

pub mod chunk;
pub mod message;

pub use chunk::{Chunk, ToolCallFragment};
pub use message::{Message, Role, ToolCall};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Supported LLM vendors, selected once per session at construction.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Vendor {
    #[cfg(feature = "openai")]
    OpenAi,
    #[cfg(feature = "anthropic")]
    Anthropic,
    #[cfg(feature = "gemini")]
    Gemini,
    #[cfg(feature = "deepseek")]
    DeepSeek,
    #[cfg(feature = "bedrock")]
    Bedrock,
}
