pub mod common;
pub mod list_directory;
pub mod read_file;
pub mod registry;
pub mod run_script;
pub mod traits;
pub mod types;
pub mod write_file;

pub use list_directory::ListDirectoryTool;
pub use read_file::ReadFileTool;
pub use registry::{ToolKind, ToolRegistry};
pub use run_script::RunScriptTool;
pub use traits::{ExecutionContext, Tool, ToolArgs};
pub use types::{ToolResult, ToolSpec};
pub use write_file::WriteFileTool;
