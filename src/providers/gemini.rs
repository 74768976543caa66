use crate::config::ProviderConfig;
use crate::error::GenerateError;
use crate::providers::{http_client, http_error, network_error, require_api_key, LlmProvider};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

const NAME: &str = "gemini";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Google Gemini `generateContent` adapter. Authenticates with the `key`
/// query parameter and asks for JSON output constrained by a response schema.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiProvider {
    /// Create a new Gemini provider from configuration
    pub fn new(config: &ProviderConfig, timeout_secs: u64) -> Result<Self, GenerateError> {
        let api_key = require_api_key(NAME, config)?;

        Ok(GeminiProvider {
            client: http_client(timeout_secs),
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        GeminiProvider {
            client: Client::new(),
            api_key,
            base_url,
            model,
            temperature: 0.7,
            max_tokens: 2048,
        }
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": self.temperature,
                "maxOutputTokens": self.max_tokens,
                "responseMimeType": "application/json",
                "responseSchema": recipe_schema()
            }
        })
    }
}

/// Structured-output hint describing the recipe array.
fn recipe_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "title": { "type": "string", "description": "Recipe name" },
                "time": { "type": "string", "description": "e.g. 20 mins" },
                "ingredients": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "List of ingredients"
                },
                "steps": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Cooking steps"
                },
                "tips": { "type": "string", "description": "Optional tips" }
            },
            "required": ["title", "time", "ingredients", "steps", "tips"]
        }
    })
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn provider_name(&self) -> &str {
        NAME
    }

    async fn call(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| network_error(NAME, e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| network_error(NAME, e))?;
        if !status.is_success() {
            return Err(http_error(NAME, status, &body));
        }
        debug!("{}", body);

        let envelope: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| GenerateError::ProviderInvalidEnvelope {
                provider: NAME.to_string(),
                message: e.to_string(),
            })?;

        let text: String = envelope
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerateError::ProviderEmptyResponse {
                provider: NAME.to_string(),
            });
        }

        Ok(text)
    }
}
