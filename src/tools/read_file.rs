use super::common::{required_str, workspace_path_property};
use super::traits::{ExecutionContext, Tool, ToolArgs};
use crate::error::ToolError;
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use tokio::io::AsyncReadExt;

/// Longest UTF-8 encoding of a single char.
const MAX_UTF8_BYTES_PER_CHAR: usize = 4;

/// Read file contents with path sandboxing and a character cap.
pub struct ReadFileTool;

impl ReadFileTool {
    pub const fn new() -> Self {
        Self
    }

    async fn read(file_path: &str, ctx: &ExecutionContext) -> Result<String, ToolError> {
        let path = ctx.sandbox.confine(file_path, "read").await?;

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                return Err(ToolError::WrongType {
                    path: file_path.to_string(),
                    expected: "a regular file".to_string(),
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ToolError::NotFound {
                    path: file_path.to_string(),
                });
            }
            Err(e) => return Err(ToolError::io("Failed to read file metadata", e)),
        }

        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|e| ToolError::io("Failed to read file", e))?;

        // Never pull more than the cap could possibly decode to.
        let byte_cap = ctx.max_read_chars.saturating_mul(MAX_UTF8_BYTES_PER_CHAR);
        let mut bytes = Vec::new();
        file.take(u64::try_from(byte_cap).unwrap_or(u64::MAX))
            .read_to_end(&mut bytes)
            .await
            .map_err(|e| ToolError::io("Failed to read file", e))?;

        let text = decode_prefix(&bytes, bytes.len() == byte_cap).ok_or_else(|| {
            ToolError::NotText {
                path: file_path.to_string(),
            }
        })?;

        let mut content: String = text.chars().take(ctx.max_read_chars).collect();
        if content.chars().count() == ctx.max_read_chars {
            content.push_str(&format!(
                "\n[...File \"{file_path}\" truncated at {} characters]",
                ctx.max_read_chars
            ));
        }

        Ok(content)
    }
}

/// Decode UTF-8, tolerating a multi-byte char split by the read cap.
fn decode_prefix(bytes: &[u8], hit_cap: bool) -> Option<&str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(e) if hit_cap && e.error_len().is_none() => {
            std::str::from_utf8(&bytes[..e.valid_up_to()]).ok()
        }
        Err(_) => None,
    }
}

impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Reads the text content of a file, constrained to the working directory. \
         Long files are truncated."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": workspace_path_property(
                    "Path of the file to read, relative to the working directory."
                )
            },
            "required": ["file_path"]
        })
    }

    fn execute<'a>(
        &'a self,
        args: &'a ToolArgs,
        ctx: &'a ExecutionContext,
    ) -> Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send + 'a>> {
        Box::pin(async move {
            let file_path = required_str(args, "file_path")?;
            Self::read(file_path, ctx).await
        })
    }
}
