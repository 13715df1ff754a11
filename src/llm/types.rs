use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A structured instruction from the model naming an operation and its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Provider-assigned call id, when the provider supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolCallRequest {
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            id: None,
            name: name.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetadata {
    pub prompt_token_count: u64,
    pub candidates_token_count: u64,
}

impl UsageMetadata {
    pub fn total(&self) -> u64 {
        self.prompt_token_count
            .saturating_add(self.candidates_token_count)
    }

    pub fn accumulate(&mut self, other: &Self) {
        self.prompt_token_count = self
            .prompt_token_count
            .saturating_add(other.prompt_token_count);
        self.candidates_token_count = self
            .candidates_token_count
            .saturating_add(other.candidates_token_count);
    }
}

/// One completion: optional text, zero or more tool calls, optional usage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
    pub usage: Option<UsageMetadata>,
}

impl ModelResponse {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_tool_calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            tool_calls,
            ..Self::default()
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Text if present and not blank.
    pub fn visible_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.trim().is_empty())
    }
}
