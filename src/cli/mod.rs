use clap::Parser;
use std::path::PathBuf;

/// `Sandpilot` - an LLM agent confined to one working directory.
#[derive(Parser, Debug)]
#[command(name = "sandpilot")]
#[command(version)]
#[command(
    about = "Ask a model to inspect, edit and run files inside a sandboxed workspace.",
    long_about = None
)]
pub struct Cli {
    /// Prompt to send; omit to start an interactive session
    pub prompt: Option<String>,

    /// Print prompts, tool arguments, tool output and token usage
    #[arg(short, long)]
    pub verbose: bool,

    /// Stay in an interactive session after answering the prompt
    #[arg(short, long)]
    pub interactive: bool,

    /// Model to use (overrides config and SANDPILOT_MODEL)
    #[arg(long)]
    pub model: Option<String>,

    /// Working directory the agent is confined to
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,

    /// Maximum provider calls per prompt
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_iterations: Option<u32>,

    /// Config file (default: ~/.sandpilot/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Whether the interactive loop should run after any one-shot prompt.
    pub fn wants_repl(&self) -> bool {
        self.interactive || self.prompt.as_deref().is_none_or(|p| p.trim().is_empty())
    }
}
