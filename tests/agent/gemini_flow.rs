use std::fs;
use std::sync::Arc;

use sandpilot::agent::{Conversation, LoopOutcome, ToolLoop, ToolLoopRunParams};
use sandpilot::llm::GeminiProvider;
use sandpilot::observability::NoopObserver;
use sandpilot::tools::ToolRegistry;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::support::shell_context;

const ENDPOINT: &str = "/models/gemini-test:generateContent";

fn provider(server: &MockServer) -> GeminiProvider {
    GeminiProvider::new("test-key", "gemini-test").with_base_url(server.uri())
}

#[tokio::test]
async fn function_call_round_trip_over_http() {
    let workspace = TempDir::new().unwrap();
    fs::write(workspace.path().join("hello.txt"), "hi from disk").unwrap();
    let server = MockServer::start().await;

    // Second request: carries the tool result back to the model.
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(query_param("key", "test-key"))
        .and(body_string_contains("hi from disk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "The file says: hi from disk"}]}
            }],
            "usageMetadata": {"promptTokenCount": 40, "candidatesTokenCount": 7}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_string_contains("functionDeclarations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{
                    "functionCall": {"name": "read_file", "args": {"file_path": "hello.txt"}}
                }]}
            }],
            "usageMetadata": {"promptTokenCount": 30, "candidatesTokenCount": 5}
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider(&server);
    let ctx = shell_context(workspace.path());
    let mut conversation = Conversation::new();
    let result = ToolLoop::new(Arc::new(ToolRegistry::builtin()), 5)
        .run(ToolLoopRunParams {
            provider: &provider,
            system_instruction: Some("You are a test agent."),
            user_message: "what does hello.txt say?",
            ctx: &ctx,
            observer: &NoopObserver,
            conversation: &mut conversation,
        })
        .await;

    assert_eq!(result.answer(), Some("The file says: hi from disk"));
    assert_eq!(result.iterations, 2);
    assert_eq!(result.usage.total(), 82);
    assert_eq!(conversation.len(), 4);
}

#[tokio::test]
async fn http_failure_faults_the_exchange() {
    let workspace = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let provider = provider(&server);
    let ctx = shell_context(workspace.path());
    let mut conversation = Conversation::new();
    let result = ToolLoop::new(Arc::new(ToolRegistry::builtin()), 5)
        .run(ToolLoopRunParams {
            provider: &provider,
            system_instruction: None,
            user_message: "hello",
            ctx: &ctx,
            observer: &NoopObserver,
            conversation: &mut conversation,
        })
        .await;

    let LoopOutcome::Faulted { error } = &result.outcome else {
        panic!("expected a fault, got {:?}", result.outcome);
    };
    assert!(error.contains("503"));
    assert!(!error.contains("test-key"));
    assert_eq!(result.iterations, 1);
}
