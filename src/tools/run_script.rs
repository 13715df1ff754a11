use super::common::{optional_string_list, required_str, workspace_path_property};
use super::traits::{ExecutionContext, Tool, ToolArgs};
use crate::error::ToolError;
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

/// Maximum captured size per stream in bytes (1 MB).
const MAX_OUTPUT_BYTES: usize = 1_048_576;
/// Environment variables safe to pass to scripts.
/// Only functional variables are included -- never API keys or secrets.
const SAFE_ENV_VARS: &[&str] = &[
    "PATH", "HOME", "TERM", "LANG", "LC_ALL", "LC_CTYPE", "USER", "SHELL",
];

const NO_OUTPUT: &str = "No output produced.";

/// Run a script from the working directory under the configured interpreter.
pub struct RunScriptTool;

impl RunScriptTool {
    pub const fn new() -> Self {
        Self
    }

    async fn run(
        file_path: &str,
        args: &[String],
        ctx: &ExecutionContext,
    ) -> Result<String, ToolError> {
        let path = ctx.sandbox.confine(file_path, "execute").await?;

        if tokio::fs::metadata(&path).await.is_err() {
            return Err(ToolError::NotFound {
                path: file_path.to_string(),
            });
        }

        let extension = path.extension().and_then(std::ffi::OsStr::to_str);
        if extension != Some(ctx.script_extension.as_str()) {
            return Err(ToolError::WrongType {
                path: file_path.to_string(),
                expected: format!("a .{} script", ctx.script_extension),
            });
        }

        // Clear the environment so the model credential never reaches the
        // child, then re-add only safe, functional variables.
        let mut cmd = tokio::process::Command::new(&ctx.interpreter);
        cmd.arg(&path)
            .args(args)
            .current_dir(ctx.sandbox.root())
            .env_clear()
            .stdin(Stdio::null())
            .kill_on_drop(true);

        for var in SAFE_ENV_VARS {
            if let Ok(val) = std::env::var(var) {
                cmd.env(var, val);
            }
        }

        tracing::debug!(interpreter = %ctx.interpreter, script = %path.display(), "spawning script");

        let output = match tokio::time::timeout(ctx.script_timeout, cmd.output()).await {
            Ok(result) => {
                result.map_err(|e| ToolError::io("executing script: failed to spawn", e))?
            }
            Err(_) => {
                return Err(ToolError::Timeout {
                    secs: ctx.script_timeout.as_secs(),
                });
            }
        };

        let stdout = capped_text(&output.stdout, "output");
        let stderr = capped_text(&output.stderr, "stderr");

        let mut parts = Vec::new();
        if !stdout.is_empty() {
            parts.push(format!("STDOUT:\n{stdout}"));
        }
        if !stderr.is_empty() {
            parts.push(format!("STDERR:\n{stderr}"));
        }
        match output.status.code() {
            Some(0) => {}
            Some(code) => parts.push(format!("Process exited with code {code}")),
            None => parts.push("Process terminated by signal".to_string()),
        }

        if parts.is_empty() {
            Ok(NO_OUTPUT.to_string())
        } else {
            Ok(parts.join("\n"))
        }
    }
}

fn capped_text(bytes: &[u8], label: &str) -> String {
    let mut text = String::from_utf8_lossy(bytes).to_string();
    if text.len() > MAX_OUTPUT_BYTES {
        text.truncate(text.floor_char_boundary(MAX_OUTPUT_BYTES));
        text.push_str(&format!("\n... [{label} truncated at 1MB]"));
    }
    text
}

impl Tool for RunScriptTool {
    fn name(&self) -> &str {
        "run_script"
    }

    fn description(&self) -> &str {
        "Executes a script file inside the working directory with optional command-line \
         arguments and returns its captured output."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": workspace_path_property(
                    "Path of the script to execute, relative to the working directory."
                ),
                "args": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Optional command-line arguments passed to the script."
                }
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
            let script_args = optional_string_list(args, "args")?;
            Self::run(file_path, &script_args, ctx).await
        })
    }
}
