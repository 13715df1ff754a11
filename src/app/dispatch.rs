use crate::Config;
use crate::agent::{Session, ToolLoop, system_instruction};
use crate::cli::Cli;
use crate::llm::create_provider;
use crate::observability::create_observer;
use crate::security::Sandbox;
use crate::tools::{ExecutionContext, ToolRegistry};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;

/// Load configuration and layer the command-line flags on top.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    apply_cli_overrides(&mut config, cli);
    config.validate()?;
    Ok(config)
}

fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(model) = cli.model.as_deref().map(str::trim)
        && !model.is_empty()
    {
        config.model = model.to_string();
    }
    if let Some(workspace) = &cli.workspace {
        config.workspace_dir = workspace.to_string_lossy().into_owned();
    }
    if let Some(max_iterations) = cli.max_iterations {
        config.max_iterations = max_iterations as usize;
    }
}

/// Wire provider, sandbox, tools and observer into a ready session.
///
/// Every failure here happens before the first prompt is sent.
pub fn build_session(config: &Config, verbose: bool) -> crate::Result<Session> {
    let provider = create_provider(config)?;
    let workspace = config.resolve_workspace()?;
    let sandbox =
        Arc::new(Sandbox::new(workspace).with_symlink_checks(config.tools.reject_symlink_escapes));
    info!(
        provider = provider.name(),
        model = provider.model(),
        workspace = %sandbox.root().display(),
        "starting agent"
    );

    let registry = Arc::new(ToolRegistry::builtin());
    let instruction = system_instruction(
        config.system_prompt.as_deref(),
        &registry,
        &config.tools.script_extension,
    );
    let ctx = ExecutionContext::new(sandbox, &config.tools);
    let tool_loop = ToolLoop::new(registry, config.max_iterations);

    Ok(Session::new(
        provider,
        tool_loop,
        ctx,
        instruction,
        create_observer(verbose),
    ))
}

/// Run a one-shot prompt, an interactive session, or both.
pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    let mut session = build_session(&config, cli.verbose)?;
    let mut stdout = std::io::stdout();

    if let Some(prompt) = cli.prompt.as_deref().map(str::trim)
        && !prompt.is_empty()
    {
        session
            .ask_and_print(prompt, &mut stdout)
            .await
            .context("Failed to run prompt")?;
    }

    if cli.wants_repl() {
        let stdin = BufReader::new(tokio::io::stdin());
        session.run_interactive(stdin, &mut stdout).await?;
    }
    Ok(())
}
