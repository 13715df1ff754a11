use super::conversation::Conversation;
use crate::llm::{Provider, ToolCallRequest, UsageMetadata};
use crate::observability::{Observer, ObserverEvent};
use crate::tools::{ExecutionContext, ToolRegistry, ToolResult, ToolSpec};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;

pub const DEFAULT_MAX_ITERATIONS: usize = 20;

/// Driver states. `Done`, `BudgetExhausted` and `Faulted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    AwaitingModel,
    Dispatching,
    Done,
    BudgetExhausted,
    Faulted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopOutcome {
    /// The model answered without requesting tools.
    Done { answer: String },
    /// Every provider call in the budget asked for more tools.
    BudgetExhausted { iterations: usize },
    /// The provider call itself failed; the exchange stops immediately.
    Faulted { error: String },
}

impl LoopOutcome {
    pub fn state(&self) -> LoopState {
        match self {
            Self::Done { .. } => LoopState::Done,
            Self::BudgetExhausted { .. } => LoopState::BudgetExhausted,
            Self::Faulted { .. } => LoopState::Faulted,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Done { .. } => "done",
            Self::BudgetExhausted { .. } => "budget_exhausted",
            Self::Faulted { .. } => "faulted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCallRecord {
    pub iteration: usize,
    pub tool_name: String,
    pub args: Map<String, Value>,
    pub result: ToolResult,
}

#[derive(Debug, Clone)]
pub struct ToolLoopResult {
    pub outcome: LoopOutcome,
    /// Provider calls made, including a failed one.
    pub iterations: usize,
    pub tool_calls: Vec<ToolCallRecord>,
    pub usage: UsageMetadata,
}

impl ToolLoopResult {
    pub fn answer(&self) -> Option<&str> {
        match &self.outcome {
            LoopOutcome::Done { answer } => Some(answer),
            LoopOutcome::BudgetExhausted { .. } | LoopOutcome::Faulted { .. } => None,
        }
    }
}

pub struct ToolLoopRunParams<'a> {
    pub provider: &'a dyn Provider,
    pub system_instruction: Option<&'a str>,
    pub user_message: &'a str,
    pub ctx: &'a ExecutionContext,
    pub observer: &'a dyn Observer,
    pub conversation: &'a mut Conversation,
}

/// Bounded request/respond/execute/append driver.
pub struct ToolLoop {
    registry: Arc<ToolRegistry>,
    max_iterations: usize,
}

struct RunState {
    started: Instant,
    iterations: usize,
    tool_calls: Vec<ToolCallRecord>,
    usage: UsageMetadata,
}

impl ToolLoop {
    pub fn new(registry: Arc<ToolRegistry>, max_iterations: usize) -> Self {
        Self {
            registry,
            max_iterations: max_iterations.max(1),
        }
    }

    /// Append `user_message` and drive the exchange to a terminal state.
    ///
    /// Every tool call appended to the conversation gets its result turn
    /// before the provider is asked again.
    pub async fn run(&self, params: ToolLoopRunParams<'_>) -> ToolLoopResult {
        let ToolLoopRunParams {
            provider,
            system_instruction,
            user_message,
            ctx,
            observer,
            conversation,
        } = params;

        conversation.push_user(user_message);
        observer.record_event(&ObserverEvent::LoopStart {
            provider: provider.name().to_string(),
            model: provider.model().to_string(),
            prompt: user_message.to_string(),
        });

        let catalogue: Vec<ToolSpec> = self.registry.catalogue();
        let mut run = RunState {
            started: Instant::now(),
            iterations: 0,
            tool_calls: Vec::new(),
            usage: UsageMetadata::default(),
        };
        let mut state = LoopState::AwaitingModel;

        while run.iterations < self.max_iterations {
            run.iterations += 1;
            tracing::debug!(iteration = run.iterations, ?state, "requesting completion");

            let response = match provider
                .generate(conversation, &catalogue, system_instruction)
                .await
            {
                Ok(response) => response,
                Err(error) => {
                    tracing::warn!(iteration = run.iterations, %error, "provider call failed");
                    let outcome = LoopOutcome::Faulted {
                        error: error.to_string(),
                    };
                    return Self::finish(run, outcome, observer);
                }
            };

            if let Some(usage) = &response.usage {
                run.usage.accumulate(usage);
            }
            observer.record_event(&ObserverEvent::ModelResponse {
                iteration: run.iterations,
                usage: response.usage,
            });

            if !response.has_tool_calls() {
                let answer = response.text.unwrap_or_default();
                if answer.is_empty() {
                    tracing::warn!(
                        iteration = run.iterations,
                        "model returned neither text nor tool calls"
                    );
                } else {
                    conversation.push_model_text(answer.as_str());
                }
                return Self::finish(run, LoopOutcome::Done { answer }, observer);
            }

            state = LoopState::Dispatching;
            tracing::debug!(?state, calls = response.tool_calls.len(), "model requested tools");
            if let Some(text) = response.visible_text() {
                conversation.push_model_text(text);
            }
            for call in response.tool_calls {
                let record = self
                    .dispatch_one(call, run.iterations, ctx, observer, conversation)
                    .await;
                run.tool_calls.push(record);
            }
            state = LoopState::AwaitingModel;
        }

        tracing::warn!(
            max_iterations = self.max_iterations,
            "iteration budget exhausted; task may be incomplete"
        );
        let outcome = LoopOutcome::BudgetExhausted {
            iterations: run.iterations,
        };
        Self::finish(run, outcome, observer)
    }

    async fn dispatch_one(
        &self,
        call: ToolCallRequest,
        iteration: usize,
        ctx: &ExecutionContext,
        observer: &dyn Observer,
        conversation: &mut Conversation,
    ) -> ToolCallRecord {
        tracing::debug!(iteration, tool = %call.name, "dispatching tool call");
        observer.record_event(&ObserverEvent::ToolCall {
            iteration,
            name: call.name.clone(),
            args: call.arguments.clone(),
        });
        conversation.push_tool_call(call.clone());

        let started = Instant::now();
        let result = self.registry.dispatch(&call, ctx).await;
        observer.record_event(&ObserverEvent::ToolResult {
            name: call.name.clone(),
            is_error: result.is_error(),
            output: result.content().to_string(),
            duration: started.elapsed(),
        });

        conversation.push_tool_response(&call, result.clone());
        ToolCallRecord {
            iteration,
            tool_name: call.name,
            args: call.arguments,
            result,
        }
    }

    fn finish(run: RunState, outcome: LoopOutcome, observer: &dyn Observer) -> ToolLoopResult {
        observer.record_event(&ObserverEvent::LoopEnd {
            outcome: outcome.label(),
            iterations: run.iterations,
            usage: run.usage,
            duration: run.started.elapsed(),
        });
        observer.flush();
        ToolLoopResult {
            outcome,
            iterations: run.iterations,
            tool_calls: run.tool_calls,
            usage: run.usage,
        }
    }
}
