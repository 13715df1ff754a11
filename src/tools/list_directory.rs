use super::common::{optional_str, workspace_path_property};
use super::traits::{ExecutionContext, Tool, ToolArgs};
use crate::error::ToolError;
use serde_json::json;
use std::future::Future;
use std::pin::Pin;

/// List directory entries with their sizes, constrained to the working directory.
pub struct ListDirectoryTool;

impl ListDirectoryTool {
    pub const fn new() -> Self {
        Self
    }

    async fn list(directory: &str, ctx: &ExecutionContext) -> Result<String, ToolError> {
        let path = ctx.sandbox.confine(directory, "list").await?;

        let is_dir = tokio::fs::metadata(&path)
            .await
            .is_ok_and(|meta| meta.is_dir());
        if !is_dir {
            return Err(ToolError::WrongType {
                path: directory.to_string(),
                expected: "a directory".to_string(),
            });
        }

        let mut entries = tokio::fs::read_dir(&path)
            .await
            .map_err(|e| ToolError::io("Failed to list directory", e))?;

        let mut lines = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ToolError::io("Failed to list directory", e))?
        {
            // Follow links for size and kind; dangling links fall back to the link itself.
            let meta = match tokio::fs::metadata(entry.path()).await {
                Ok(meta) => meta,
                Err(_) => entry
                    .metadata()
                    .await
                    .map_err(|e| ToolError::io("Failed to read entry metadata", e))?,
            };
            lines.push(format!(
                "- {}: file_size={} bytes, is_dir={}",
                entry.file_name().to_string_lossy(),
                meta.len(),
                meta.is_dir()
            ));
        }

        Ok(lines.join("\n"))
    }
}

impl Tool for ListDirectoryTool {
    fn name(&self) -> &str {
        "list_directory"
    }

    fn description(&self) -> &str {
        "Lists files in the specified directory along with their sizes, constrained to the working directory."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "directory": workspace_path_property(
                    "The directory to list files from, relative to the working directory. \
                     If not provided, lists files in the working directory itself."
                )
            }
        })
    }

    fn execute<'a>(
        &'a self,
        args: &'a ToolArgs,
        ctx: &'a ExecutionContext,
    ) -> Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send + 'a>> {
        Box::pin(async move {
            let directory = optional_str(args, "directory")?.unwrap_or(".");
            Self::list(directory, ctx).await
        })
    }
}
