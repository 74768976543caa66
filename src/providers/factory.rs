use crate::config::{AppConfig, ProviderConfig};
use crate::error::GenerateError;
use crate::providers::{ChatCompletionsProvider, GeminiProvider, LlmProvider};

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider instance from configuration
    pub fn create(
        provider_name: &str,
        config: &ProviderConfig,
        timeout_secs: u64,
    ) -> Result<Box<dyn LlmProvider>, GenerateError> {
        match provider_name {
            "gemini" => Ok(Box::new(GeminiProvider::new(config, timeout_secs)?)),
            "grok" => Ok(Box::new(ChatCompletionsProvider::new(
                "grok",
                "https://api.x.ai",
                "grok-3-fast",
                config,
                timeout_secs,
            )?)),
            "openai" => Ok(Box::new(ChatCompletionsProvider::new(
                "openai",
                "https://api.openai.com",
                "gpt-4o-mini",
                config,
                timeout_secs,
            )?)),
            _ => Err(GenerateError::UnknownProvider(provider_name.to_string())),
        }
    }

    /// Create a provider by name using its entry in the application config.
    pub fn from_app_config(
        provider_name: &str,
        config: &AppConfig,
    ) -> Result<Box<dyn LlmProvider>, GenerateError> {
        Self::create(
            provider_name,
            &config.provider(provider_name),
            config.timeout,
        )
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["gemini", "grok", "openai"]
    }
}
