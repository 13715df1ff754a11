use super::Config;
use super::types::API_KEY_ENV;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV)
            && !key.is_empty()
        {
            self.api_key = Some(key);
        }

        if let Ok(model) = std::env::var("SANDPILOT_MODEL")
            && !model.is_empty()
        {
            self.model = model;
        }

        if let Ok(workspace) = std::env::var("SANDPILOT_WORKSPACE")
            && !workspace.is_empty()
        {
            self.workspace_dir = workspace;
        }

        if let Ok(raw) = std::env::var("SANDPILOT_MAX_ITERATIONS")
            && let Ok(max_iterations) = raw.parse::<usize>()
            && max_iterations > 0
        {
            self.max_iterations = max_iterations;
        }

        if let Ok(raw) = std::env::var("SANDPILOT_TEMPERATURE")
            && let Ok(temperature) = raw.parse::<f64>()
            && (0.0..=2.0).contains(&temperature)
        {
            self.temperature = temperature;
        }
    }
}
