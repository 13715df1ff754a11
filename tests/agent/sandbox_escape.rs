use std::fs;
use std::sync::Arc;

use sandpilot::agent::{Conversation, ToolLoop, ToolLoopRunParams};
use sandpilot::llm::{ModelResponse, ToolCallRequest};
use sandpilot::observability::NoopObserver;
use sandpilot::tools::{ExecutionContext, ToolRegistry, ToolResult};
use serde_json::json;
use tempfile::TempDir;

use super::support::{ScriptedProvider, call, calls, shell_context};

async fn run_calls(ctx: &ExecutionContext, requests: Vec<ToolCallRequest>) -> Vec<ToolResult> {
    let provider = ScriptedProvider::new(vec![calls(requests), ModelResponse::text_only("ok")]);
    let mut conversation = Conversation::new();
    let result = ToolLoop::new(Arc::new(ToolRegistry::builtin()), 5)
        .run(ToolLoopRunParams {
            provider: &provider,
            system_instruction: None,
            user_message: "try to escape",
            ctx,
            observer: &NoopObserver,
            conversation: &mut conversation,
        })
        .await;
    assert_eq!(result.answer(), Some("ok"));
    result.tool_calls.into_iter().map(|record| record.result).collect()
}

#[tokio::test]
async fn every_operation_refuses_paths_outside_the_workspace() {
    let outer = TempDir::new().unwrap();
    let workspace = outer.path().join("ws");
    fs::create_dir(&workspace).unwrap();
    fs::write(outer.path().join("secret.txt"), "top secret").unwrap();
    fs::write(outer.path().join("evil.sh"), "touch pwned\n").unwrap();
    let ctx = shell_context(&workspace);

    let results = run_calls(
        &ctx,
        vec![
            call("list_directory", json!({"directory": ".."})),
            call("read_file", json!({"file_path": "../secret.txt"})),
            call("write_file", json!({"file_path": "../planted.txt", "content": "x"})),
            call("run_script", json!({"file_path": "../evil.sh"})),
            call("read_file", json!({"file_path": "sub/../../secret.txt"})),
        ],
    )
    .await;

    assert_eq!(
        results,
        vec![
            ToolResult::error(
                "Cannot list \"..\" as it is outside the permitted working directory"
            ),
            ToolResult::error(
                "Cannot read \"../secret.txt\" as it is outside the permitted working directory"
            ),
            ToolResult::error(
                "Cannot write to \"../planted.txt\" as it is outside the permitted working directory"
            ),
            ToolResult::error(
                "Cannot execute \"../evil.sh\" as it is outside the permitted working directory"
            ),
            ToolResult::error(
                "Cannot read \"sub/../../secret.txt\" as it is outside the permitted working directory"
            ),
        ]
    );
    assert!(!outer.path().join("planted.txt").exists());
    assert!(!outer.path().join("pwned").exists());
    assert!(!workspace.join("pwned").exists());
}

#[tokio::test]
async fn sibling_directory_with_shared_prefix_is_outside() {
    let outer = TempDir::new().unwrap();
    let workspace = outer.path().join("work");
    let sibling = outer.path().join("work2");
    fs::create_dir(&workspace).unwrap();
    fs::create_dir(&sibling).unwrap();
    fs::write(sibling.join("data.txt"), "not yours").unwrap();
    let ctx = shell_context(&workspace);

    let results = run_calls(
        &ctx,
        vec![call("read_file", json!({"file_path": "../work2/data.txt"}))],
    )
    .await;

    assert!(results[0].is_error());
    assert!(results[0].content().contains("outside the permitted working directory"));
}

#[cfg(unix)]
#[tokio::test]
async fn symlinks_leading_out_are_rejected() {
    let outer = TempDir::new().unwrap();
    let workspace = outer.path().join("ws");
    fs::create_dir(&workspace).unwrap();
    fs::write(outer.path().join("secret.txt"), "top secret").unwrap();
    std::os::unix::fs::symlink(outer.path(), workspace.join("escape")).unwrap();
    let ctx = shell_context(&workspace);

    let results = run_calls(
        &ctx,
        vec![
            call("read_file", json!({"file_path": "escape/secret.txt"})),
            call("write_file", json!({"file_path": "escape/planted.txt", "content": "x"})),
        ],
    )
    .await;

    assert!(results.iter().all(ToolResult::is_error));
    assert!(!outer.path().join("planted.txt").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn dangling_symlink_cannot_plant_files_outside() {
    let outer = TempDir::new().unwrap();
    let workspace = outer.path().join("ws");
    fs::create_dir(&workspace).unwrap();
    std::os::unix::fs::symlink(outer.path().join("planted.txt"), workspace.join("link")).unwrap();
    let ctx = shell_context(&workspace);

    let results = run_calls(
        &ctx,
        vec![call("write_file", json!({"file_path": "link", "content": "pwned"}))],
    )
    .await;

    assert_eq!(
        results,
        vec![ToolResult::error(
            "Cannot write to \"link\" as it is outside the permitted working directory"
        )]
    );
    assert!(!outer.path().join("planted.txt").exists());
}
