use std::fs;
use std::sync::Arc;

use sandpilot::agent::{LoopOutcome, Session, ToolLoop, ToolLoopRunParams, Turn};
use sandpilot::agent::{Conversation, system_instruction};
use sandpilot::llm::ModelResponse;
use sandpilot::observability::NoopObserver;
use sandpilot::tools::{ToolRegistry, ToolResult};
use serde_json::json;
use tempfile::TempDir;

use super::support::{ScriptedProvider, call, calls, shell_context};

fn seeded_workspace() -> TempDir {
    let workspace = TempDir::new().unwrap();
    fs::create_dir_all(workspace.path().join("pkg")).unwrap();
    fs::write(
        workspace.path().join("pkg/calc.sh"),
        "echo \"result: $(( $1 - $2 ))\"\n",
    )
    .unwrap();
    fs::write(workspace.path().join("README.md"), "calculator\n").unwrap();
    workspace
}

#[tokio::test]
async fn inspect_fix_and_verify_a_script() {
    let workspace = seeded_workspace();
    let provider = ScriptedProvider::new(vec![
        calls(vec![call("list_directory", json!({"directory": "pkg"}))]),
        calls(vec![call("read_file", json!({"file_path": "pkg/calc.sh"}))]),
        calls(vec![call(
            "write_file",
            json!({"file_path": "pkg/calc.sh", "content": "echo \"result: $(( $1 + $2 ))\"\n"}),
        )]),
        calls(vec![call(
            "run_script",
            json!({"file_path": "pkg/calc.sh", "args": ["3", "5"]}),
        )]),
        ModelResponse::text_only("Fixed: the script now adds its arguments."),
    ]);
    let registry = Arc::new(ToolRegistry::builtin());
    let ctx = shell_context(workspace.path());
    let instruction = system_instruction(None, &registry, "sh");
    let mut conversation = Conversation::new();

    let result = ToolLoop::new(Arc::clone(&registry), 20)
        .run(ToolLoopRunParams {
            provider: &provider,
            system_instruction: Some(instruction.as_str()),
            user_message: "fix the calculator: it should add",
            ctx: &ctx,
            observer: &NoopObserver,
            conversation: &mut conversation,
        })
        .await;

    assert_eq!(
        result.answer(),
        Some("Fixed: the script now adds its arguments.")
    );
    assert_eq!(result.iterations, 5);
    assert_eq!(result.tool_calls.len(), 4);

    let listing = result.tool_calls[0].result.content();
    assert!(listing.contains("- calc.sh: file_size="));
    assert!(listing.contains("is_dir=false"));
    assert_eq!(
        result.tool_calls[1].result,
        ToolResult::ok("echo \"result: $(( $1 - $2 ))\"\n")
    );
    assert!(result.tool_calls[2].result.content().contains("characters written"));
    assert_eq!(
        result.tool_calls[3].result,
        ToolResult::ok("STDOUT:\nresult: 8\n")
    );

    let on_disk = fs::read_to_string(workspace.path().join("pkg/calc.sh")).unwrap();
    assert!(on_disk.contains("$1 + $2"));

    // Every request advertised the full catalogue and the same instruction.
    for names in provider.seen_tool_names() {
        assert_eq!(names.len(), 4);
    }
    assert!(
        provider
            .seen_system()
            .iter()
            .all(|system| system.as_deref() == Some(instruction.as_str()))
    );
    assert_eq!(conversation.pending_tool_calls(), 0);
    assert_eq!(conversation.len(), 1 + 4 * 2 + 1);
}

#[tokio::test]
async fn each_provider_call_sees_every_prior_result() {
    let workspace = seeded_workspace();
    let provider = ScriptedProvider::new(vec![
        calls(vec![
            call("read_file", json!({"file_path": "README.md"})),
            call("read_file", json!({"file_path": "missing.md"})),
        ]),
        ModelResponse::text_only("read it"),
    ]);
    let ctx = shell_context(workspace.path());
    let mut conversation = Conversation::new();

    ToolLoop::new(Arc::new(ToolRegistry::builtin()), 20)
        .run(ToolLoopRunParams {
            provider: &provider,
            system_instruction: None,
            user_message: "what is this project?",
            ctx: &ctx,
            observer: &NoopObserver,
            conversation: &mut conversation,
        })
        .await;

    let seen = provider.seen_conversations();
    assert_eq!(seen.len(), 2);
    let second = seen[1].turns();
    assert_eq!(second.len(), 5);
    assert!(matches!(
        &second[2],
        Turn::ToolResponse { result: ToolResult::Ok(text), .. } if text == "calculator\n"
    ));
    assert!(matches!(
        &second[4],
        Turn::ToolResponse { result: ToolResult::Error(text), .. }
            if text == "File \"missing.md\" not found."
    ));
}

#[tokio::test]
async fn budget_exhaustion_keeps_partial_work() {
    let workspace = seeded_workspace();
    let responses = (0..3)
        .map(|i| {
            calls(vec![call(
                "write_file",
                json!({"file_path": format!("out/{i}.txt"), "content": "x"}),
            )])
        })
        .collect();
    let provider = ScriptedProvider::new(responses);
    let ctx = shell_context(workspace.path());
    let mut conversation = Conversation::new();

    let result = ToolLoop::new(Arc::new(ToolRegistry::builtin()), 3)
        .run(ToolLoopRunParams {
            provider: &provider,
            system_instruction: None,
            user_message: "write forever",
            ctx: &ctx,
            observer: &NoopObserver,
            conversation: &mut conversation,
        })
        .await;

    assert_eq!(result.outcome, LoopOutcome::BudgetExhausted { iterations: 3 });
    for i in 0..3 {
        assert!(workspace.path().join(format!("out/{i}.txt")).is_file());
    }
    assert_eq!(provider.seen_conversations().len(), 3);
}

#[tokio::test]
async fn session_keeps_history_between_prompts() {
    let workspace = seeded_workspace();
    let provider = Arc::new(ScriptedProvider::new(vec![
        calls(vec![call(
            "write_file",
            json!({"file_path": "notes.txt", "content": "remember me"}),
        )]),
        ModelResponse::text_only("saved"),
        ModelResponse::text_only("you asked me to save a note"),
    ]));
    let registry = Arc::new(ToolRegistry::builtin());
    let mut session = Session::new(
        provider.clone(),
        ToolLoop::new(Arc::clone(&registry), 20),
        shell_context(workspace.path()),
        "be brief".to_string(),
        Box::new(NoopObserver),
    );

    let first = session.ask("save a note").await;
    assert_eq!(first.answer(), Some("saved"));
    let second = session.ask("what did I ask?").await;
    assert_eq!(second.answer(), Some("you asked me to save a note"));

    let last = provider.seen_conversations().pop().unwrap();
    assert_eq!(
        last.turns().first(),
        Some(&Turn::User {
            text: "save a note".into()
        })
    );
    assert_eq!(session.conversation().len(), 6);
}
