//! Provider module for SheetQA
//!
//! This module contains the completion provider abstraction and its
//! implementations for OpenAI-compatible APIs and Ollama.

pub mod base;
pub mod ollama;
pub mod openai;

pub use base::{
    CompletionFailure, CompletionResponse, Message, Provider, TokenUsage,
    MISSING_CREDENTIALS_MESSAGE, TIMEOUT_MESSAGE, UNAVAILABLE_MESSAGE,
};
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use crate::config::ProviderConfig;
use crate::error::{Result, SheetQaError};

/// Create a provider instance based on configuration
///
/// # Errors
///
/// Returns error if the provider type is invalid or initialization fails
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    create_provider_with_override(config, None, None)
}

/// Create a provider instance with optional provider and model overrides
///
/// # Arguments
///
/// * `config` - Full provider configuration
/// * `provider_override` - Optional provider type override ("openai" or "ollama")
/// * `model_override` - Optional model name override
///
/// # Errors
///
/// Returns error if the provider type is invalid or initialization fails
///
/// # Examples
///
/// ```
/// use sheetqa::config::ProviderConfig;
/// use sheetqa::providers::create_provider_with_override;
///
/// let config = ProviderConfig::default();
/// let provider = create_provider_with_override(&config, Some("ollama"), Some("gemma2:2b")).unwrap();
/// assert_eq!(provider.name(), "ollama");
/// ```
pub fn create_provider_with_override(
    config: &ProviderConfig,
    provider_override: Option<&str>,
    model_override: Option<&str>,
) -> Result<Box<dyn Provider>> {
    let provider_type = provider_override.unwrap_or(&config.provider_type);

    match provider_type {
        "openai" => {
            let mut openai_config = config.openai.clone();
            if let Some(model) = model_override {
                openai_config.model = model.to_string();
            }
            Ok(Box::new(OpenAiProvider::new(openai_config)?))
        }
        "ollama" => {
            let mut ollama_config = config.ollama.clone();
            if let Some(model) = model_override {
                ollama_config.model = model.to_string();
            }
            Ok(Box::new(OllamaProvider::new(ollama_config)?))
        }
        _ => Err(
            SheetQaError::Provider(format!("Unknown provider type: {}", provider_type)).into(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider_default_is_openai() {
        let provider = create_provider(&ProviderConfig::default()).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_create_provider_invalid_type() {
        let config = ProviderConfig {
            provider_type: "invalid".to_string(),
            ..ProviderConfig::default()
        };
        let result = create_provider(&config);
        assert!(result.is_err());
        if let Err(e) = result {
            assert!(e.to_string().contains("Unknown provider type"));
        }
    }

    #[test]
    fn test_create_provider_with_override_provider_only() {
        let provider =
            create_provider_with_override(&ProviderConfig::default(), Some("ollama"), None)
                .unwrap();
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn test_create_provider_with_override_invalid_provider() {
        let result = create_provider_with_override(&ProviderConfig::default(), Some("nope"), None);
        assert!(result.is_err());
    }
}
