use super::types::ModelResponse;
use crate::agent::Conversation;
use crate::error::LlmError;
use crate::tools::ToolSpec;
use std::future::Future;
use std::pin::Pin;

/// A remote model that completes a conversation given a tool catalogue.
pub trait Provider: Send + Sync {
    /// Provider identifier (e.g. "gemini").
    fn name(&self) -> &str;

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    fn generate<'a>(
        &'a self,
        conversation: &'a Conversation,
        tools: &'a [ToolSpec],
        system_instruction: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<ModelResponse, LlmError>> + Send + 'a>>;
}
