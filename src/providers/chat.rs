use crate::config::ProviderConfig;
use crate::error::GenerateError;
use crate::providers::{http_client, http_error, network_error, require_api_key, LlmProvider};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

const SYSTEM_PROMPT: &str = "Return only a JSON array. No markdown, no explanation.";

/// Adapter for OpenAI-compatible `chat/completions` endpoints (xAI Grok,
/// OpenAI). Authenticates with a bearer token.
pub struct ChatCompletionsProvider {
    name: String,
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

impl ChatCompletionsProvider {
    /// Create a chat-completions provider from configuration, falling back to
    /// the given endpoint and model when the configuration leaves them out.
    pub fn new(
        name: &str,
        default_base_url: &str,
        default_model: &str,
        config: &ProviderConfig,
        timeout_secs: u64,
    ) -> Result<Self, GenerateError> {
        let api_key = require_api_key(name, config)?;

        Ok(ChatCompletionsProvider {
            name: name.to_string(),
            client: http_client(timeout_secs),
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| default_base_url.to_string()),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| default_model.to_string()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(name: &str, api_key: String, base_url: String, model: String) -> Self {
        ChatCompletionsProvider {
            name: name.to_string(),
            client: Client::new(),
            api_key,
            base_url,
            model,
            temperature: 0.7,
            max_tokens: 2048,
        }
    }
}

#[async_trait]
impl LlmProvider for ChatCompletionsProvider {
    fn provider_name(&self) -> &str {
        &self.name
    }

    async fn call(&self, prompt: &str) -> Result<String, GenerateError> {
        let response = self
            .client
            .post(format!(
                "{}/v1/chat/completions",
                self.base_url.trim_end_matches('/')
            ))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": SYSTEM_PROMPT},
                    {"role": "user", "content": prompt}
                ],
                "temperature": self.temperature,
                "max_tokens": self.max_tokens
            }))
            .send()
            .await
            .map_err(|e| network_error(&self.name, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| network_error(&self.name, e))?;
        if !status.is_success() {
            return Err(http_error(&self.name, status, &body));
        }
        debug!("{}", body);

        let envelope: ChatResponse =
            serde_json::from_str(&body).map_err(|e| GenerateError::ProviderInvalidEnvelope {
                provider: self.name.clone(),
                message: e.to_string(),
            })?;

        envelope
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| GenerateError::ProviderEmptyResponse {
                provider: self.name.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn provider(server: &Server) -> ChatCompletionsProvider {
        ChatCompletionsProvider::with_base_url(
            "grok",
            "fake_api_key".to_string(),
            server.url(),
            "grok-3-fast".to_string(),
        )
    }

    #[tokio::test]
    async fn test_call() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer fake_api_key")
            .match_body(Matcher::PartialJson(json!({
                "model": "grok-3-fast",
                "messages": [
                    {"role": "system", "content": SYSTEM_PROMPT},
                    {"role": "user", "content": "rice, dal"}
                ],
                "temperature": 0.7,
                "max_tokens": 2048
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "choices": [{
                        "message": {
                            "content": "[{\"title\":\"Khichdi\"}]"
                        }
                    }]
                }"#,
            )
            .create_async()
            .await;

        let result = provider(&server).call("rice, dal").await.unwrap();
        assert_eq!(result, r#"[{"title":"Khichdi"}]"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_call_api_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "Invalid request"}"#)
            .create_async()
            .await;

        let err = provider(&server).call("rice").await.unwrap_err();
        assert!(matches!(
            err,
            GenerateError::ProviderHttpError { status: 400, .. }
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_call_rate_limited() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body(r#"{"error": "Too many requests"}"#)
            .create_async()
            .await;

        let err = provider(&server).call("rice").await.unwrap_err();
        assert!(err.is_quota());
        assert!(err.to_string().contains("grok quota exceeded"));
    }

    #[tokio::test]
    async fn test_call_empty_content() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": [{"message": {"content": "  "}}]}"#)
            .create_async()
            .await;

        let err = provider(&server).call("rice").await.unwrap_err();
        assert!(matches!(err, GenerateError::ProviderEmptyResponse { .. }));
    }

    #[tokio::test]
    async fn test_call_unreachable_is_network_error() {
        // Nothing listens on the discard port.
        let provider = ChatCompletionsProvider::with_base_url(
            "openai",
            "k".to_string(),
            "http://127.0.0.1:9".to_string(),
            "gpt-4o-mini".to_string(),
        );
        let err = provider.call("rice").await.unwrap_err();
        assert!(err.is_network());
    }

    #[test]
    fn test_config_overrides_defaults() {
        let config = ProviderConfig {
            api_key: Some("k".to_string()),
            model: Some("grok-3-mini".to_string()),
            base_url: Some("https://proxy.example".to_string()),
            ..Default::default()
        };
        let provider =
            ChatCompletionsProvider::new("grok", "https://api.x.ai", "grok-3-fast", &config, 30)
                .unwrap();
        assert_eq!(provider.provider_name(), "grok");
        assert_eq!(provider.model, "grok-3-mini");
        assert_eq!(provider.base_url, "https://proxy.example");
    }
}
