use crate::config::AppConfig;
use crate::error::GenerateError;
use crate::model::Recipe;
use crate::parse::parse_recipes;
use crate::providers::{build_prompt, LlmProvider, ProviderFactory};
use log::{debug, error, info, warn};

/// Tries providers in priority order until one yields recipes.
///
/// Attempts are strictly sequential: each provider is fully awaited before the
/// next one is tried.
pub struct RecipeGenerator {
    providers: Vec<Box<dyn LlmProvider>>,
}

/// Result of one provider attempt, as seen by the chain.
enum Attempt {
    Success(Vec<Recipe>),
    /// Move on to the next provider.
    Retryable(GenerateError),
    /// Stop the chain and surface this error.
    Terminal(GenerateError),
}

impl From<Result<Vec<Recipe>, GenerateError>> for Attempt {
    fn from(result: Result<Vec<Recipe>, GenerateError>) -> Self {
        match result {
            Ok(recipes) => Attempt::Success(recipes),
            Err(e) if e.is_fallback_eligible() => Attempt::Retryable(e),
            Err(e) => Attempt::Terminal(e),
        }
    }
}

impl RecipeGenerator {
    /// Build a chain from explicit providers, tried in the given order.
    pub fn new(providers: Vec<Box<dyn LlmProvider>>) -> Self {
        RecipeGenerator { providers }
    }

    /// Build the chain from configuration. A provider is part of the chain
    /// when it appears in `fallback.order`, is enabled and has an API key.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut providers: Vec<Box<dyn LlmProvider>> = Vec::new();

        for provider_name in &config.fallback.order {
            if providers.iter().any(|p| p.provider_name() == provider_name) {
                warn!("Provider '{}' listed twice in fallback order", provider_name);
                continue;
            }

            if !config.provider(provider_name).enabled {
                debug!("Provider '{}' is disabled in configuration", provider_name);
                continue;
            }

            match ProviderFactory::from_app_config(provider_name, config) {
                Ok(provider) => {
                    info!("Added '{}' to fallback chain", provider_name);
                    providers.push(provider);
                }
                Err(e @ GenerateError::ProviderNotConfigured { .. }) => {
                    debug!("Skipping provider: {}", e);
                }
                Err(GenerateError::UnknownProvider(name)) => {
                    warn!(
                        "Unknown provider '{}' in fallback order (available: {})",
                        name,
                        ProviderFactory::available_providers().join(", ")
                    );
                }
                Err(e) => {
                    warn!("Failed to initialize provider '{}': {}", provider_name, e);
                }
            }
        }

        RecipeGenerator { providers }
    }

    /// Names of the providers in the chain, in priority order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.provider_name()).collect()
    }

    /// Generate recipes for the user's ingredients or request.
    ///
    /// Fails with [`GenerateError::EmptyPrompt`] or
    /// [`GenerateError::NoProviderConfigured`] before any network activity.
    /// Otherwise the result is either a non-empty list of recipes or
    /// [`GenerateError::AllProvidersFailed`] wrapping the last failure.
    pub async fn generate(&self, user_input: &str) -> Result<Vec<Recipe>, GenerateError> {
        let trimmed = user_input.trim();
        if trimmed.is_empty() {
            return Err(GenerateError::EmptyPrompt);
        }
        if self.providers.is_empty() {
            return Err(GenerateError::NoProviderConfigured);
        }

        let prompt = build_prompt(trimmed);
        let mut attempted = Vec::with_capacity(self.providers.len());
        let mut last_error = None;

        for provider in &self.providers {
            let name = provider.provider_name();
            attempted.push(name.to_string());
            debug!("Attempting generation with {}", name);

            match Attempt::from(self.attempt(provider.as_ref(), &prompt).await) {
                Attempt::Success(recipes) => {
                    info!("Generated {} recipe(s) using {}", recipes.len(), name);
                    return Ok(recipes);
                }
                Attempt::Retryable(e) => {
                    warn!("Provider {} failed: {}", name, e);
                    last_error = Some(e);
                }
                Attempt::Terminal(e) => {
                    error!("Provider {} failed, not trying others: {}", name, e);
                    return Err(e);
                }
            }
        }

        match last_error {
            Some(last) => Err(GenerateError::AllProvidersFailed {
                attempted,
                last: Box::new(last),
            }),
            None => Err(GenerateError::NoProviderConfigured),
        }
    }

    async fn attempt(
        &self,
        provider: &dyn LlmProvider,
        prompt: &str,
    ) -> Result<Vec<Recipe>, GenerateError> {
        let raw = provider.call(prompt).await?;
        parse_recipes(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Replies with fixed text, counting calls.
    struct Scripted {
        name: &'static str,
        reply: &'static str,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl LlmProvider for Scripted {
        fn provider_name(&self) -> &str {
            self.name
        }

        async fn call(&self, _prompt: &str) -> Result<String, GenerateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.to_string())
        }
    }

    /// Always fails with an error that stops the chain.
    struct Misconfigured;

    #[async_trait]
    impl LlmProvider for Misconfigured {
        fn provider_name(&self) -> &str {
            "misconfigured"
        }

        async fn call(&self, _prompt: &str) -> Result<String, GenerateError> {
            Err(GenerateError::UnknownProvider("misconfigured".to_string()))
        }
    }

    fn scripted(
        name: &'static str,
        reply: &'static str,
    ) -> (Box<dyn LlmProvider>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = Scripted {
            name,
            reply,
            calls: calls.clone(),
        };
        (Box::new(provider), calls)
    }

    const GOOD: &str = r#"[{"title":"Upma","time":"15 mins","ingredients":["rava"],"steps":["Roast rava"],"tips":""}]"#;

    fn keyed(key: &str) -> ProviderConfig {
        ProviderConfig {
            api_key: Some(key.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_first_success_stops_chain() {
        let (first, first_calls) = scripted("gemini", GOOD);
        let (second, second_calls) = scripted("grok", GOOD);
        let generator = RecipeGenerator::new(vec![first, second]);

        let recipes = generator.generate("rava").await.unwrap();
        assert_eq!(recipes[0].title, "Upma");
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_garbage_output_falls_through() {
        let (first, _) = scripted("gemini", "I am not sure what to cook.");
        let (second, second_calls) = scripted("grok", GOOD);
        let generator = RecipeGenerator::new(vec![first, second]);

        let recipes = generator.generate("rava").await.unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_terminal_error_stops_chain() {
        let (second, second_calls) = scripted("grok", GOOD);
        let generator = RecipeGenerator::new(vec![Box::new(Misconfigured), second]);

        let err = generator.generate("rava").await.unwrap_err();
        assert!(matches!(err, GenerateError::UnknownProvider(_)));
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_all_failed_wraps_last_error() {
        let (first, _) = scripted("gemini", "[]");
        let (second, _) = scripted("grok", "{}");
        let generator = RecipeGenerator::new(vec![first, second]);

        match generator.generate("rava").await {
            Err(GenerateError::AllProvidersFailed { attempted, last }) => {
                assert_eq!(attempted, vec!["gemini", "grok"]);
                assert!(matches!(*last, GenerateError::InvalidResponseShape));
            }
            other => panic!("expected AllProvidersFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_from_config_follows_order_and_skips_unconfigured() {
        let mut config = AppConfig::default();
        config.fallback.order = vec![
            "openai".to_string(),
            "mystery".to_string(),
            "gemini".to_string(),
            "grok".to_string(),
            "openai".to_string(),
        ];
        config.providers.insert("openai".to_string(), keyed("sk-1"));
        config.providers.insert("grok".to_string(), keyed("xai-1"));

        let generator = RecipeGenerator::from_config(&config);
        assert_eq!(generator.provider_names(), vec!["openai", "grok"]);
    }

    #[test]
    fn test_from_config_skips_disabled() {
        let mut config = AppConfig::default();
        let mut gemini = keyed("g-1");
        gemini.enabled = false;
        config.providers.insert("gemini".to_string(), gemini);

        let generator = RecipeGenerator::from_config(&config);
        assert!(generator.provider_names().is_empty());
    }
}
