use super::types::ToolSpec;
use crate::config::ToolsConfig;
use crate::error::ToolError;
use crate::security::Sandbox;
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Arguments of a single tool call, as decoded from the model.
pub type ToolArgs = Map<String, Value>;

/// Per-process execution context injected into every tool call.
///
/// The model never supplies or sees any of this; the working directory in
/// particular is fixed at startup.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub sandbox: Arc<Sandbox>,
    pub max_read_chars: usize,
    pub script_timeout: Duration,
    pub interpreter: String,
    pub script_extension: String,
}

impl ExecutionContext {
    pub fn new(sandbox: Arc<Sandbox>, tools: &ToolsConfig) -> Self {
        Self {
            sandbox,
            max_read_chars: tools.max_read_chars,
            script_timeout: Duration::from_secs(tools.script_timeout_secs),
            interpreter: tools.interpreter.clone(),
            script_extension: tools.script_extension.trim_start_matches('.').to_string(),
        }
    }

    #[cfg(test)]
    pub fn test_default(workspace: impl Into<std::path::PathBuf>) -> Self {
        let tools = ToolsConfig {
            interpreter: "sh".to_string(),
            script_extension: "sh".to_string(),
            ..ToolsConfig::default()
        };
        Self::new(Arc::new(Sandbox::new(workspace)), &tools)
    }
}

/// One implementation per sandboxed operation.
pub trait Tool: Send + Sync {
    /// Tool name (used in LLM function calling)
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// JSON schema for parameters
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with given arguments
    fn execute<'a>(
        &'a self,
        args: &'a ToolArgs,
        ctx: &'a ExecutionContext,
    ) -> Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send + 'a>>;

    /// Get the full spec for LLM registration
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}
