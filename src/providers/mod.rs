mod chat;
mod factory;
mod fallback;
mod gemini;
mod prompt;

pub use chat::ChatCompletionsProvider;
pub use factory::ProviderFactory;
pub use fallback::RecipeGenerator;
pub use gemini::GeminiProvider;
pub use prompt::{build_prompt, BASE_PROMPT, EXPECTED_JSON_SCHEMA};

use crate::config::{ProviderConfig, CREDENTIAL_ENV_VARS};
use crate::error::{snippet, GenerateError};
use async_trait::async_trait;
use reqwest::StatusCode;

/// Unified trait for all LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "gemini", "grok")
    fn provider_name(&self) -> &str;

    /// Send a fully built prompt and return the generated text.
    async fn call(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// Body wording that signals rate limiting even without a 429 status.
const QUOTA_MARKERS: &[&str] = &["rate limit", "rate_limit", "quota", "resource_exhausted"];

/// Classify a non-success provider response.
pub(crate) fn http_error(provider: &str, status: StatusCode, body: &str) -> GenerateError {
    let lowered = body.to_lowercase();
    if status == StatusCode::TOO_MANY_REQUESTS || QUOTA_MARKERS.iter().any(|m| lowered.contains(m))
    {
        return GenerateError::ProviderQuotaExceeded {
            provider: provider.to_string(),
            status: status.as_u16(),
        };
    }
    GenerateError::ProviderHttpError {
        provider: provider.to_string(),
        status: status.as_u16(),
        body: snippet(body),
    }
}

/// The URL is stripped from the message since it may carry the API key.
pub(crate) fn network_error(provider: &str, err: reqwest::Error) -> GenerateError {
    GenerateError::ProviderNetwork {
        provider: provider.to_string(),
        message: err.without_url().to_string(),
    }
}

/// API key for `provider`, failing before any network activity when absent.
pub(crate) fn require_api_key(
    provider: &str,
    config: &ProviderConfig,
) -> Result<String, GenerateError> {
    config
        .api_key
        .clone()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| GenerateError::ProviderNotConfigured {
            provider: provider.to_string(),
            env_var: CREDENTIAL_ENV_VARS
                .iter()
                .find(|(name, _)| *name == provider)
                .and_then(|(_, vars)| vars.first().copied())
                .unwrap_or("an API key variable"),
        })
}

/// Build the shared HTTP client with the configured request timeout.
pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
