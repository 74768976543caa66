use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;

/// Well-known environment variables holding provider credentials, in lookup
/// order per provider.
pub const CREDENTIAL_ENV_VARS: &[(&str, &[&str])] = &[
    ("gemini", &["GEMINI_KEY", "NEXT_PUBLIC_GEMINI_KEY"]),
    ("grok", &["GROK_KEY", "NEXT_PUBLIC_GROK_KEY"]),
    ("openai", &["OPENAI_API_KEY"]),
];

/// Main application configuration, built once at process start and passed by
/// reference afterwards.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Map of provider name to provider configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider priority order for the fallback chain
    #[serde(default)]
    pub fallback: FallbackConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Provider request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Configuration for a specific AI provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider may be used at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Model identifier; each adapter has its own default
    pub model: Option<String>,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            model: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key: None,
            base_url: None,
        }
    }
}

/// Configuration for provider fallback
#[derive(Debug, Deserialize, Clone)]
pub struct FallbackConfig {
    /// Order of providers to try (first to last)
    #[serde(default = "default_order")]
    pub order: Vec<String>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            order: default_order(),
        }
    }
}

/// Configuration for the HTTP boundary
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Include error details in 500 responses (development only)
    #[serde(default)]
    pub expose_error_details: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            expose_error_details: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            fallback: FallbackConfig::default(),
            server: ServerConfig::default(),
            timeout: default_timeout(),
        }
    }
}

// Default value functions
fn default_enabled() -> bool {
    true
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_order() -> Vec<String> {
    vec![
        "gemini".to_string(),
        "grok".to_string(),
        "openai".to_string(),
    ]
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_timeout() -> u64 {
    60
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with JALDIKHANA__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Provider keys missing after that are taken from the well-known
    /// variables in [`CREDENTIAL_ENV_VARS`] (e.g. `GEMINI_KEY`).
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = load_config()?;
        config.apply_credentials(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Fill in missing provider API keys using `lookup` on the well-known
    /// credential variable names. Blank values count as absent.
    pub fn apply_credentials<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for (provider, vars) in CREDENTIAL_ENV_VARS {
            let entry = self.providers.entry(provider.to_string()).or_default();
            if entry
                .api_key
                .as_deref()
                .is_some_and(|k| !k.trim().is_empty())
            {
                continue;
            }
            entry.api_key = vars
                .iter()
                .filter_map(|var| lookup(var))
                .find(|value| !value.trim().is_empty());
        }
    }

    /// Configuration for `name`, or defaults when the file and environment say
    /// nothing about it.
    pub fn provider(&self, name: &str) -> ProviderConfig {
        self.providers.get(name).cloned().unwrap_or_default()
    }
}

/// Load configuration from file and environment variables
///
/// Environment variable format: JALDIKHANA__PROVIDERS__GEMINI__MODEL
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: JALDIKHANA__SERVER__BIND
        // The priority list is comma separated: JALDIKHANA__FALLBACK__ORDER=grok,gemini
        .add_source(
            Environment::with_prefix("JALDIKHANA")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("fallback.order")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
