//! Folds an ordered chunk sequence into one finished message.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::error::{Result, RivuletError};
use crate::types::{Chunk, Message, Role, ToolCall};

/// Tool call being assembled for one index.
#[derive(Debug, Default)]
struct PendingToolCall {
    id: Option<String>,
    name: String,
    arguments: String,
}

/// Owns the in-progress message for the duration of one session.
///
/// Chunks must be applied in arrival order; applying them out of order is
/// undefined for argument text within a tool-call index. `model_id` and the
/// token counts follow last-non-null-wins, since vendors report totals (often
/// only on the terminal frame), never per-frame deltas.
#[derive(Debug, Default)]
pub struct MessageAccumulator {
    content: String,
    model_id: Option<String>,
    input_tokens: Option<u32>,
    output_tokens: Option<u32>,
    tool_calls: BTreeMap<usize, PendingToolCall>,
    finished: bool,
}

impl MessageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one chunk into the in-progress message.
    pub fn apply(&mut self, chunk: &Chunk) -> Result<()> {
        if self.finished {
            return Err(RivuletError::InvalidState(
                "apply called after finish".into(),
            ));
        }

        self.content.push_str(&chunk.content);
        if chunk.model_id.is_some() {
            self.model_id = chunk.model_id.clone();
        }
        if chunk.input_tokens.is_some() {
            self.input_tokens = chunk.input_tokens;
        }
        if chunk.output_tokens.is_some() {
            self.output_tokens = chunk.output_tokens;
        }

        for fragment in &chunk.tool_calls {
            // A fragment whose id differs from the one already recorded at
            // its index is a new call, not a continuation: vendors that
            // deliver whole calls restart part numbering on every frame.
            let index = match self.tool_calls.get(&fragment.index) {
                Some(entry)
                    if fragment.id.is_some() && entry.id.is_some() && entry.id != fragment.id =>
                {
                    self.tool_calls.keys().next_back().map_or(0, |last| last + 1)
                }
                _ => fragment.index,
            };
            let entry = self.tool_calls.entry(index).or_default();
            if entry.id.is_none() {
                entry.id = fragment.id.clone();
            }
            if let Some(ref name) = fragment.name {
                if !name.is_empty() {
                    entry.name = name.clone();
                }
            }
            entry.arguments.push_str(&fragment.arguments);
        }

        Ok(())
    }

    /// Freeze the message. The accumulator is unusable afterwards.
    pub fn finish(&mut self) -> Result<Message> {
        if self.finished {
            return Err(RivuletError::InvalidState("finish called twice".into()));
        }
        self.finished = true;

        let tool_calls = std::mem::take(&mut self.tool_calls)
            .into_iter()
            .map(|(index, pending)| {
                let call = ToolCall {
                    id: pending.id.unwrap_or_else(|| format!("call_{index}")),
                    name: pending.name,
                    arguments: pending.arguments,
                };
                (index, call)
            })
            .collect();

        Ok(Message {
            role: Role::Assistant,
            content: std::mem::take(&mut self.content),
            model_id: self.model_id.take(),
            tool_calls,
            input_tokens: self.input_tokens,
            output_tokens: self.output_tokens,
            timestamp: Utc::now(),
        })
    }
}
