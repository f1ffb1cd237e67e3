//! Finished message types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Conversation role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A fully assembled tool call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Raw argument text exactly as streamed.
    pub arguments: String,
}

impl ToolCall {
    /// Parse the streamed argument text as JSON, falling back to a string
    /// value when the text is not valid JSON.
    pub fn parse_arguments(&self) -> serde_json::Value {
        serde_json::from_str(&self.arguments)
            .unwrap_or(serde_json::Value::String(self.arguments.clone()))
    }
}

/// The finished logical turn produced by folding a chunk sequence.
///
/// Indistinguishable from a message obtained via a non-streamed response:
/// all assembly details (frame boundaries, partial tool calls) are gone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    /// Assembled tool calls keyed by call index.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tool_calls: BTreeMap<usize, ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u32>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn text(&self) -> &str {
        &self.content
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}
