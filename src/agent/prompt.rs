use crate::tools::{ToolKind, ToolRegistry};

/// System instruction sent with every provider call.
///
/// A configured override replaces the generated text entirely.
pub fn system_instruction(
    override_text: Option<&str>,
    registry: &ToolRegistry,
    script_extension: &str,
) -> String {
    if let Some(text) = override_text.map(str::trim).filter(|text| !text.is_empty()) {
        return text.to_string();
    }

    let mut prompt = String::from(
        "You are a helpful AI coding agent.\n\n\
         When a user asks a question or makes a request, make a function call plan. \
         You can perform the following operations:\n\n",
    );
    for name in registry.tool_names() {
        let line = match ToolKind::from_name(name) {
            Some(ToolKind::ListDirectory) => "List files and directories".to_string(),
            Some(ToolKind::ReadFile) => "Read file contents".to_string(),
            Some(ToolKind::RunScript) => format!(
                "Execute .{} files with optional arguments",
                script_extension.trim_start_matches('.')
            ),
            Some(ToolKind::WriteFile) => "Write or overwrite files".to_string(),
            None => continue,
        };
        prompt.push_str("- ");
        prompt.push_str(&line);
        prompt.push('\n');
    }
    prompt.push_str(
        "\nAll paths you provide should be relative to the working directory. \
         You do not need to specify the working directory in your function calls \
         as it is automatically injected for security reasons.",
    );
    prompt
}
