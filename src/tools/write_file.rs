use super::common::{required_str, workspace_path_property};
use super::traits::{ExecutionContext, Tool, ToolArgs};
use crate::error::ToolError;
use serde_json::json;
use std::future::Future;
use std::pin::Pin;

/// Write file contents with path sandboxing.
///
/// Overwrites unconditionally and creates missing parent directories. The
/// write is not atomic: an interrupted write leaves a partial file.
pub struct WriteFileTool;

impl WriteFileTool {
    pub const fn new() -> Self {
        Self
    }

    async fn write(
        file_path: &str,
        content: &str,
        ctx: &ExecutionContext,
    ) -> Result<String, ToolError> {
        let path = ctx.sandbox.confine(file_path, "write to").await?;

        if tokio::fs::metadata(&path)
            .await
            .is_ok_and(|meta| meta.is_dir())
        {
            return Err(ToolError::WrongType {
                path: file_path.to_string(),
                expected: "a regular file".to_string(),
            });
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::io("Failed to create parent directories", e))?;
        }

        tokio::fs::write(&path, content)
            .await
            .map_err(|e| ToolError::io("Failed to write file", e))?;

        Ok(format!(
            "Successfully wrote to \"{file_path}\" ({} characters written)",
            content.chars().count()
        ))
    }
}

impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Writes content to a file, constrained to the working directory. \
         Creates missing parent directories and overwrites existing files."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": workspace_path_property(
                    "Path of the file to write, relative to the working directory."
                ),
                "content": {
                    "type": "string",
                    "description": "Content to write to the file"
                }
            },
            "required": ["file_path", "content"]
        })
    }

    fn execute<'a>(
        &'a self,
        args: &'a ToolArgs,
        ctx: &'a ExecutionContext,
    ) -> Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send + 'a>> {
        Box::pin(async move {
            let file_path = required_str(args, "file_path")?;
            let content = required_str(args, "content")?;
            Self::write(file_path, content, ctx).await
        })
    }
}
