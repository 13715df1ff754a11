pub mod path;

pub use path::{PathEscape, Sandbox, resolve};
