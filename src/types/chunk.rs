//! Normalized stream increments.

use serde::{Deserialize, Serialize};

use super::message::Role;

/// One normalized increment of an in-flight response.
///
/// A chunk is meaningful only within the ordered sequence it belongs to:
/// content fragments are positional, and tool-call arguments arrive as
/// partial text that must be concatenated in order by the accumulator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub role: Role,
    /// Vendor-reported model actually used; often absent on early frames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    /// Text fragment for this increment. Empty is valid and does not signal
    /// stream end.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallFragment>,
}

impl Chunk {
    /// Empty assistant chunk, the starting point for every decoder.
    pub fn assistant() -> Self {
        Self {
            role: Role::Assistant,
            model_id: None,
            content: String::new(),
            input_tokens: None,
            output_tokens: None,
            tool_calls: Vec::new(),
        }
    }

    /// Whether this chunk carries anything worth folding.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
            && self.model_id.is_none()
            && self.input_tokens.is_none()
            && self.output_tokens.is_none()
            && self.tool_calls.is_empty()
    }
}

/// A possibly-partial piece of one tool call, keyed by call index.
///
/// `arguments` is a positional text fragment, not a whole value: fragments
/// for the same index concatenate in arrival order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallFragment {
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub arguments: String,
}

impl ToolCallFragment {
    /// Fragment carrying only argument text for an already-started call.
    pub fn arguments(index: usize, arguments: impl Into<String>) -> Self {
        Self {
            index,
            id: None,
            name: None,
            arguments: arguments.into(),
        }
    }
}
