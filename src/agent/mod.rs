pub mod conversation;
pub mod prompt;
pub mod session;
pub mod tool_loop;

pub use conversation::{Conversation, Turn};
pub use prompt::system_instruction;
pub use session::{ReplCommand, Session, render_outcome};
pub use tool_loop::{
    DEFAULT_MAX_ITERATIONS, LoopOutcome, LoopState, ToolCallRecord, ToolLoop, ToolLoopResult,
    ToolLoopRunParams,
};
