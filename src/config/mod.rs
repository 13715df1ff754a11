mod env_overrides;
mod loader;
#[cfg(test)]
mod test_env;
mod types;

pub use loader::default_config_path;
pub use types::{Config, ToolsConfig};
