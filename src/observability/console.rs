use super::traits::{Observer, ObserverEvent};
use serde_json::Value;
use std::io::Write;
use std::sync::Mutex;

/// User-facing progress lines for the terminal.
///
/// Tool calls are always announced; verbose mode adds the prompt, call
/// arguments, tool output and token counts.
pub struct ConsoleObserver<W: Write + Send = std::io::Stdout> {
    out: Mutex<W>,
    verbose: bool,
}

impl ConsoleObserver {
    pub fn stdout(verbose: bool) -> Self {
        Self::new(std::io::stdout(), verbose)
    }
}

impl<W: Write + Send> ConsoleObserver<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self {
            out: Mutex::new(out),
            verbose,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn render(&self, event: &ObserverEvent) -> Option<String> {
        match event {
            ObserverEvent::LoopStart { prompt, .. } if self.verbose => {
                Some(format!("User prompt: {prompt}"))
            }
            ObserverEvent::ModelResponse {
                usage: Some(usage), ..
            } if self.verbose => Some(format!(
                "Prompt tokens: {}\nResponse tokens: {}",
                usage.prompt_token_count, usage.candidates_token_count
            )),
            ObserverEvent::ToolCall { name, args, .. } => Some(if self.verbose {
                format!("Calling function: {name}({})", Value::Object(args.clone()))
            } else {
                format!(" - Calling function: {name}")
            }),
            ObserverEvent::ToolResult {
                output, is_error, ..
            } if self.verbose => Some(if *is_error {
                format!("-> Error: {output}")
            } else {
                format!("-> {output}")
            }),
            ObserverEvent::LoopEnd { usage, .. } if self.verbose => Some(format!(
                "Total tokens: {} (prompt {}, response {})",
                usage.total(),
                usage.prompt_token_count,
                usage.candidates_token_count
            )),
            _ => None,
        }
    }
}

impl<W: Write + Send> Observer for ConsoleObserver<W> {
    fn record_event(&self, event: &ObserverEvent) {
        let Some(line) = self.render(event) else {
            return;
        };
        let mut out = self
            .out
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // A closed stdout must not abort the exchange.
        let _ = writeln!(out, "{line}");
    }

    fn flush(&self) {
        if let Ok(mut out) = self.out.lock() {
            let _ = out.flush();
        }
    }

    fn name(&self) -> &str {
        "console"
    }
}
