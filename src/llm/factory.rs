use super::gemini::GeminiProvider;
use super::traits::Provider;
use crate::config::Config;
use crate::error::ConfigError;
use std::sync::Arc;

/// Build the configured provider. A missing credential is a startup fault.
pub fn create_provider(config: &Config) -> Result<Arc<dyn Provider>, ConfigError> {
    let api_key = config.require_api_key()?;
    let provider = GeminiProvider::new(api_key.trim(), config.model.clone())
        .with_base_url(config.api_base_url.clone())
        .with_temperature(config.temperature);
    Ok(Arc::new(provider))
}
