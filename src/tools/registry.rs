use super::list_directory::ListDirectoryTool;
use super::read_file::ReadFileTool;
use super::run_script::RunScriptTool;
use super::traits::{ExecutionContext, Tool};
use super::types::{ToolResult, ToolSpec};
use super::write_file::WriteFileTool;
use crate::error::ToolError;
use crate::llm::ToolCallRequest;

static LIST_DIRECTORY: ListDirectoryTool = ListDirectoryTool::new();
static READ_FILE: ReadFileTool = ReadFileTool::new();
static RUN_SCRIPT: RunScriptTool = RunScriptTool::new();
static WRITE_FILE: WriteFileTool = WriteFileTool::new();

/// The fixed set of operations the model may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    ListDirectory,
    ReadFile,
    RunScript,
    WriteFile,
}

impl ToolKind {
    pub const ALL: [Self; 4] = [
        Self::ListDirectory,
        Self::ReadFile,
        Self::RunScript,
        Self::WriteFile,
    ];

    pub fn tool(self) -> &'static dyn Tool {
        match self {
            Self::ListDirectory => &LIST_DIRECTORY,
            Self::ReadFile => &READ_FILE,
            Self::RunScript => &RUN_SCRIPT,
            Self::WriteFile => &WRITE_FILE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ListDirectory => "list_directory",
            Self::ReadFile => "read_file",
            Self::RunScript => "run_script",
            Self::WriteFile => "write_file",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// Static registry built once at startup. No dynamic registration.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    kinds: Vec<ToolKind>,
}

impl ToolRegistry {
    pub fn new(kinds: Vec<ToolKind>) -> Self {
        Self { kinds }
    }

    /// Registry exposing all four built-in operations.
    pub fn builtin() -> Self {
        Self::new(ToolKind::ALL.to_vec())
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        self.kinds.iter().map(|kind| kind.name()).collect()
    }

    /// Capability catalogue advertised to the model, in registration order.
    pub fn catalogue(&self) -> Vec<ToolSpec> {
        self.kinds.iter().map(|kind| kind.tool().spec()).collect()
    }

    fn lookup(&self, name: &str) -> Option<ToolKind> {
        ToolKind::from_name(name).filter(|kind| self.kinds.contains(kind))
    }

    /// Run one tool call. Every failure comes back as [`ToolResult::Error`].
    pub async fn dispatch(&self, call: &ToolCallRequest, ctx: &ExecutionContext) -> ToolResult {
        let Some(kind) = self.lookup(&call.name) else {
            tracing::debug!(tool = %call.name, "unknown tool requested");
            return ToolResult::error(
                ToolError::UnknownTool {
                    name: call.name.clone(),
                }
                .to_string(),
            );
        };

        let result = kind.tool().execute(&call.arguments, ctx).await;
        if let Err(error) = &result {
            tracing::debug!(tool = kind.name(), %error, "tool call failed");
        }
        result.into()
    }
}
