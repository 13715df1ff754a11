use super::conversation::Conversation;
use super::tool_loop::{LoopOutcome, ToolLoop, ToolLoopResult, ToolLoopRunParams};
use crate::llm::Provider;
use crate::observability::Observer;
use crate::tools::ExecutionContext;
use anyhow::{Context, Result};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

pub const HELP_TEXT: &str = "\
Commands:
  exit, quit, bye   end the session
  clear             forget the conversation so far
  help              show this message
Anything else is sent to the model as a prompt.";

pub const EMPTY_ANSWER_NOTE: &str = "(The model returned an empty response.)";

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Exit,
    Clear,
    Help,
    Empty,
    Prompt(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" => Self::Empty,
            "exit" | "quit" | "bye" => Self::Exit,
            "clear" => Self::Clear,
            "help" => Self::Help,
            _ => Self::Prompt(trimmed.to_string()),
        }
    }
}

/// User-facing text for a finished exchange.
pub fn render_outcome(result: &ToolLoopResult) -> String {
    match &result.outcome {
        LoopOutcome::Done { answer } if answer.trim().is_empty() => {
            EMPTY_ANSWER_NOTE.to_string()
        }
        LoopOutcome::Done { answer } => answer.clone(),
        LoopOutcome::BudgetExhausted { iterations } => format!(
            "Stopped after {iterations} iterations without a final answer; \
             the task may be incomplete."
        ),
        LoopOutcome::Faulted { error } => format!("Error: {error}"),
    }
}

/// A conversation bound to one provider, sandbox and observer.
pub struct Session {
    provider: Arc<dyn Provider>,
    tool_loop: ToolLoop,
    ctx: ExecutionContext,
    system_instruction: String,
    observer: Box<dyn Observer>,
    conversation: Conversation,
}

impl Session {
    pub fn new(
        provider: Arc<dyn Provider>,
        tool_loop: ToolLoop,
        ctx: ExecutionContext,
        system_instruction: String,
        observer: Box<dyn Observer>,
    ) -> Self {
        Self {
            provider,
            tool_loop,
            ctx,
            system_instruction,
            observer,
            conversation: Conversation::new(),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn reset(&mut self) {
        self.conversation.clear();
    }

    /// Run one exchange on top of the existing history.
    pub async fn ask(&mut self, prompt: &str) -> ToolLoopResult {
        self.tool_loop
            .run(ToolLoopRunParams {
                provider: self.provider.as_ref(),
                system_instruction: Some(self.system_instruction.as_str()),
                user_message: prompt,
                ctx: &self.ctx,
                observer: self.observer.as_ref(),
                conversation: &mut self.conversation,
            })
            .await
    }

    /// Ask once and print the outcome.
    pub async fn ask_and_print<W: Write>(&mut self, prompt: &str, out: &mut W) -> Result<()> {
        let result = self.ask(prompt).await;
        writeln!(out, "{}", render_outcome(&result)).context("Failed to write response")?;
        out.flush().context("Failed to flush output")?;
        Ok(())
    }

    /// Read-eval-print loop until `exit`, end of input or Ctrl-C.
    pub async fn run_interactive<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        writeln!(out, "Interactive session. Type 'help' for commands.")?;
        let mut lines = input.lines();

        loop {
            write!(out, "> ")?;
            out.flush()?;

            let line = tokio::select! {
                line = lines.next_line() => line.context("Failed to read input")?,
                _ = tokio::signal::ctrl_c() => {
                    writeln!(out)?;
                    break;
                }
            };
            let Some(line) = line else {
                writeln!(out)?;
                break;
            };

            match ReplCommand::parse(&line) {
                ReplCommand::Empty => {}
                ReplCommand::Exit => break,
                ReplCommand::Clear => {
                    self.reset();
                    writeln!(out, "Conversation cleared.")?;
                }
                ReplCommand::Help => writeln!(out, "{HELP_TEXT}")?,
                ReplCommand::Prompt(prompt) => self.ask_and_print(&prompt, out).await?,
            }
        }

        writeln!(out, "Goodbye.")?;
        Ok(())
    }
}
