use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `sandpilot`.
///
/// Only startup failures surface as Rust errors. A failed provider call ends
/// the exchange as a faulted outcome, and tool failures are converted to
/// model-visible text at the registry boundary.
#[derive(Debug, Error)]
pub enum AgentError {
    // ── Config / startup ────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("missing credential: set {var} in the environment or a .env file")]
    MissingCredential { var: String },

    #[error("workspace {path} is not an accessible directory")]
    Workspace { path: String },
}

// ─── LLM / Provider errors ──────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider {provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("provider {provider} authentication failed")]
    Auth { provider: String },

    #[error("provider {provider} returned no candidates")]
    EmptyResponse { provider: String },
}

// ─── Tool errors ────────────────────────────────────────────────────────────

/// Failures of a sandboxed operation. The `Display` output is what the model
/// reads, so messages name the path exactly as the model supplied it.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Cannot {action} \"{path}\" as it is outside the permitted working directory")]
    SandboxViolation { action: &'static str, path: String },

    #[error("File \"{path}\" not found.")]
    NotFound { path: String },

    #[error("\"{path}\" is not {expected}")]
    WrongType { path: String, expected: String },

    #[error("File \"{path}\" is not valid UTF-8 text")]
    NotText { path: String },

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("executing script: Process timed out after {secs} seconds")]
    Timeout { secs: u64 },

    #[error("Unknown function: {name}")]
    UnknownTool { name: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl ToolError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// True for the sandbox-escape class, which must never touch the filesystem.
    pub fn is_sandbox_violation(&self) -> bool {
        matches!(self, Self::SandboxViolation { .. })
    }
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, AgentError>;
