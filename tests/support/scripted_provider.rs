#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use sandpilot::agent::Conversation;
use sandpilot::config::ToolsConfig;
use sandpilot::error::LlmError;
use sandpilot::llm::{ModelResponse, Provider, ToolCallRequest};
use sandpilot::security::Sandbox;
use sandpilot::tools::{ExecutionContext, ToolSpec};
use serde_json::Value;

/// Replays canned responses and records what it was asked.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<ModelResponse, LlmError>>>,
    seen_conversations: Mutex<Vec<Conversation>>,
    seen_tool_names: Mutex<Vec<Vec<String>>>,
    seen_system: Mutex<Vec<Option<String>>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ModelResponse>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    pub fn with_results(responses: Vec<Result<ModelResponse, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from(responses)),
            seen_conversations: Mutex::new(Vec::new()),
            seen_tool_names: Mutex::new(Vec::new()),
            seen_system: Mutex::new(Vec::new()),
        }
    }

    pub fn seen_conversations(&self) -> Vec<Conversation> {
        self.seen_conversations
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn seen_tool_names(&self) -> Vec<Vec<String>> {
        self.seen_tool_names
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn seen_system(&self) -> Vec<Option<String>> {
        self.seen_system
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    fn generate<'a>(
        &'a self,
        conversation: &'a Conversation,
        tools: &'a [ToolSpec],
        system_instruction: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<ModelResponse, LlmError>> + Send + 'a>> {
        Box::pin(async move {
            self.seen_conversations
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(conversation.clone());
            self.seen_tool_names
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(tools.iter().map(|spec| spec.name.clone()).collect());
            self.seen_system
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(system_instruction.map(str::to_string));

            self.responses
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .pop_front()
                .unwrap_or_else(|| Ok(ModelResponse::text_only("")))
        })
    }
}

pub fn call(name: &str, args: Value) -> ToolCallRequest {
    let Value::Object(arguments) = args else {
        panic!("tool arguments must be a JSON object");
    };
    ToolCallRequest::new(name, arguments)
}

pub fn calls(requests: Vec<ToolCallRequest>) -> ModelResponse {
    ModelResponse::with_tool_calls(requests)
}

/// Execution context over `root` that runs `.sh` scripts with `sh`.
pub fn shell_context(root: &Path) -> ExecutionContext {
    let tools = ToolsConfig {
        interpreter: "sh".to_string(),
        script_extension: "sh".to_string(),
        script_timeout_secs: 5,
        ..ToolsConfig::default()
    };
    ExecutionContext::new(Arc::new(Sandbox::new(root)), &tools)
}
