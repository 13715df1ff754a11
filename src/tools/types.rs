use crate::error::ToolError;
use serde::{Deserialize, Serialize};

/// Outcome of one tool call, always a single text payload the model can read.
///
/// Errors are data here: both variants are appended to the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolResult {
    Ok(String),
    Error(String),
}

impl ToolResult {
    pub fn ok(text: impl Into<String>) -> Self {
        Self::Ok(text.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Raw payload without the `Error:` prefix.
    pub fn content(&self) -> &str {
        match self {
            Self::Ok(text) | Self::Error(text) => text,
        }
    }

    /// Text as shown to the model and the user.
    pub fn to_model_text(&self) -> String {
        match self {
            Self::Ok(text) => text.clone(),
            Self::Error(message) => format!("Error: {message}"),
        }
    }
}

impl From<Result<String, ToolError>> for ToolResult {
    fn from(result: Result<String, ToolError>) -> Self {
        match result {
            Ok(text) => Self::Ok(text),
            Err(error) => Self::Error(error.to_string()),
        }
    }
}

/// Description of a tool for the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}
