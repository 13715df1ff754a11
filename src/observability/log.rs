use super::traits::{Observer, ObserverEvent};
use tracing::{debug, info};

/// Tracing-backed observer
pub struct LogObserver;

impl LogObserver {
    pub fn new() -> Self {
        Self
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Observer for LogObserver {
    fn record_event(&self, event: &ObserverEvent) {
        match event {
            ObserverEvent::LoopStart {
                provider, model, ..
            } => {
                info!(provider = %provider, model = %model, "loop.start");
            }
            ObserverEvent::ModelResponse { iteration, usage } => {
                debug!(
                    iteration,
                    prompt_tokens = usage.map(|u| u.prompt_token_count),
                    response_tokens = usage.map(|u| u.candidates_token_count),
                    "model.response"
                );
            }
            ObserverEvent::ToolCall {
                iteration, name, ..
            } => {
                debug!(iteration, tool = %name, "tool.call");
            }
            ObserverEvent::ToolResult {
                name,
                is_error,
                duration,
                ..
            } => {
                debug!(tool = %name, is_error, duration_ms = millis(*duration), "tool.result");
            }
            ObserverEvent::LoopEnd {
                outcome,
                iterations,
                usage,
                duration,
            } => {
                info!(
                    outcome,
                    iterations,
                    tokens = usage.total(),
                    duration_ms = millis(*duration),
                    "loop.end"
                );
            }
        }
    }

    fn name(&self) -> &str {
        "log"
    }
}
