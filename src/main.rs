#![warn(clippy::all, clippy::pedantic)]

use anyhow::{Context, Result};
use clap::Parser;
use sandpilot::{Cli, Config, app};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// `--verbose` wins, then the `log_level` config key, then WARN.
fn log_level(cli: &Cli, config: &Config) -> Level {
    if cli.verbose {
        return Level::DEBUG;
    }
    config
        .log_level
        .as_deref()
        .and_then(|level| level.trim().parse().ok())
        .unwrap_or(Level::WARN)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = app::load_config(&cli)?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(&cli, &config))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;

    app::dispatch(cli, config).await
}
