use crate::llm::UsageMetadata;
use serde_json::{Map, Value};
use std::time::Duration;

/// Events the feedback loop reports while driving one exchange.
#[derive(Debug, Clone)]
pub enum ObserverEvent {
    LoopStart {
        provider: String,
        model: String,
        prompt: String,
    },
    ModelResponse {
        iteration: usize,
        usage: Option<UsageMetadata>,
    },
    ToolCall {
        iteration: usize,
        name: String,
        args: Map<String, Value>,
    },
    ToolResult {
        name: String,
        is_error: bool,
        output: String,
        duration: Duration,
    },
    LoopEnd {
        outcome: &'static str,
        iterations: usize,
        usage: UsageMetadata,
        duration: Duration,
    },
}

/// Sink for loop events. The driver never prints directly.
pub trait Observer: Send + Sync {
    /// Record a discrete event
    fn record_event(&self, event: &ObserverEvent);

    /// Flush any buffered output (no-op for most backends)
    fn flush(&self) {}

    /// Human-readable name of this observer
    fn name(&self) -> &str;
}
