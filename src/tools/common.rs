use super::traits::ToolArgs;
use crate::error::ToolError;
use serde_json::{Value, json};

pub(crate) fn workspace_path_property(description: &str) -> Value {
    json!({
        "type": "string",
        "description": description
    })
}

pub(crate) fn required_str<'a>(args: &'a ToolArgs, key: &str) -> Result<&'a str, ToolError> {
    match args.get(key) {
        Some(Value::String(value)) => Ok(value),
        Some(_) => Err(ToolError::InvalidArguments(format!(
            "'{key}' must be a string"
        ))),
        None => Err(ToolError::InvalidArguments(format!(
            "missing required argument '{key}'"
        ))),
    }
}

pub(crate) fn optional_str<'a>(
    args: &'a ToolArgs,
    key: &str,
) -> Result<Option<&'a str>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(_) => Err(ToolError::InvalidArguments(format!(
            "'{key}' must be a string"
        ))),
    }
}

pub(crate) fn optional_string_list(args: &ToolArgs, key: &str) -> Result<Vec<String>, ToolError> {
    let invalid = || ToolError::InvalidArguments(format!("'{key}' must be an array of strings"));
    match args.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
            .collect(),
        Some(_) => Err(invalid()),
    }
}

#[cfg(test)]
pub(crate) fn args(value: Value) -> ToolArgs {
    match value {
        Value::Object(map) => map,
        other => panic!("test arguments must be an object, got {other}"),
    }
}
