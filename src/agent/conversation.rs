use crate::llm::ToolCallRequest;
use crate::tools::ToolResult;
use serde::{Deserialize, Serialize};

/// One entry of the exchange, in causal order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Turn {
    User {
        text: String,
    },
    Model {
        text: String,
    },
    ToolCalls {
        calls: Vec<ToolCallRequest>,
    },
    ToolResponse {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        name: String,
        result: ToolResult,
    },
}

/// Append-only log replayed in full on every provider call.
///
/// Owned by the caller and lent to the driver for one exchange at a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::User { text: text.into() });
    }

    pub fn push_model_text(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::Model { text: text.into() });
    }

    pub fn push_tool_call(&mut self, call: ToolCallRequest) {
        self.turns.push(Turn::ToolCalls { calls: vec![call] });
    }

    pub fn push_tool_response(&mut self, call: &ToolCallRequest, result: ToolResult) {
        self.turns.push(Turn::ToolResponse {
            id: call.id.clone(),
            name: call.name.clone(),
            result,
        });
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Number of tool calls that have no result turn yet.
    pub fn pending_tool_calls(&self) -> usize {
        self.turns.iter().fold(0usize, |pending, turn| match turn {
            Turn::ToolCalls { calls } => pending + calls.len(),
            Turn::ToolResponse { .. } => pending.saturating_sub(1),
            Turn::User { .. } | Turn::Model { .. } => pending,
        })
    }
}
