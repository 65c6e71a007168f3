pub mod gemini;
pub mod mock;

use crate::llm::GenerationClient;
use anyhow::{bail, Result};
use seedling_core::LlmConfig;
use std::sync::Arc;

pub use gemini::GeminiClient;
pub use mock::MockProvider;

/// Build the client named by `config.provider`.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn GenerationClient>> {
    match config.provider.to_ascii_lowercase().as_str() {
        "gemini" => Ok(Arc::new(GeminiClient::new(config)?)),
        "mock" => Ok(Arc::new(MockProvider::new(&config.model))),
        other => bail!("Unknown LLM provider: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_is_rejected() {
        let config = LlmConfig {
            provider: "carrier-pigeon".into(),
            ..Default::default()
        };
        let err = create_client(&config).err().unwrap();
        assert!(err.to_string().contains("carrier-pigeon"));
    }

    #[test]
    fn test_mock_provider_needs_no_key() {
        let config = LlmConfig {
            provider: "Mock".into(),
            ..Default::default()
        };
        assert!(create_client(&config).is_ok());
    }
}
