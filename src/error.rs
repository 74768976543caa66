use thiserror::Error;

/// Message shown to the user instead of transport details when every provider
/// failed because of the network.
pub const CONNECTIVITY_MESSAGE: &str = "No internet or server unreachable. Check your connection.";

/// Maximum number of characters kept from provider bodies and model output in
/// error messages.
const SNIPPET_LEN: usize = 200;

/// Errors that can occur while generating recipes
#[derive(Error, Debug)]
pub enum GenerateError {
    /// User input was empty after trimming
    #[error("Please enter ingredients or a cooking prompt")]
    EmptyPrompt,

    /// No credential is available for this provider
    #[error("{provider} is not configured: set {env_var} or providers.{provider}.api_key")]
    ProviderNotConfigured {
        provider: String,
        env_var: &'static str,
    },

    /// Provider name in the priority list that no adapter implements
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Request never produced an HTTP response (connect, timeout, body read)
    #[error("{provider} request failed: {message}")]
    ProviderNetwork { provider: String, message: String },

    /// Provider answered with a non-success status
    #[error("{provider} API error: {status} - {body}")]
    ProviderHttpError {
        provider: String,
        status: u16,
        body: String,
    },

    /// Provider signalled rate-limit or quota exhaustion
    #[error("{provider} quota exceeded. Wait a minute and try again.")]
    ProviderQuotaExceeded { provider: String, status: u16 },

    /// Success status but no generated text in the envelope
    #[error("{provider} returned no text")]
    ProviderEmptyResponse { provider: String },

    /// Success status but the body is not the provider's JSON envelope
    #[error("{provider} returned an unreadable response: {message}")]
    ProviderInvalidEnvelope { provider: String, message: String },

    /// Repaired model output still failed strict parsing
    #[error("Invalid recipe JSON from AI: {message} (text: {snippet})")]
    MalformedModelOutput { message: String, snippet: String },

    /// Parsed model output is not a JSON array
    #[error("AI did not return a JSON array")]
    InvalidResponseShape,

    /// Parsed model output contained no usable recipe
    #[error("No valid recipes in AI response (got: {snippet})")]
    NoValidRecipes { snippet: String },

    /// No provider has a credential
    #[error(
        "No AI API key configured. Add GEMINI_KEY, GROK_KEY or OPENAI_API_KEY to the environment"
    )]
    NoProviderConfigured,

    /// Every enabled provider was attempted and failed
    #[error("All providers failed (tried: {}): {last}", .attempted.join(", "))]
    AllProvidersFailed {
        attempted: Vec<String>,
        last: Box<GenerateError>,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl GenerateError {
    /// Message suitable for showing to the end user.
    ///
    /// The last concrete error of an exhausted fallback chain is surfaced as
    /// is, except that network failures collapse to [`CONNECTIVITY_MESSAGE`].
    pub fn user_message(&self) -> String {
        match self {
            GenerateError::AllProvidersFailed { last, .. } => last.user_message(),
            GenerateError::ProviderNetwork { .. } => CONNECTIVITY_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Whether this failure, raised while attempting one provider, lets the
    /// orchestrator move on to the next provider in the chain.
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(
            self,
            GenerateError::ProviderNetwork { .. }
                | GenerateError::ProviderHttpError { .. }
                | GenerateError::ProviderQuotaExceeded { .. }
                | GenerateError::ProviderEmptyResponse { .. }
                | GenerateError::ProviderInvalidEnvelope { .. }
                | GenerateError::MalformedModelOutput { .. }
                | GenerateError::InvalidResponseShape
                | GenerateError::NoValidRecipes { .. }
        )
    }

    /// True for transport failures, including an exhausted chain whose last
    /// failure was one.
    pub fn is_network(&self) -> bool {
        match self {
            GenerateError::ProviderNetwork { .. } => true,
            GenerateError::AllProvidersFailed { last, .. } => last.is_network(),
            _ => false,
        }
    }

    /// True when the user should wait before retrying.
    pub fn is_quota(&self) -> bool {
        match self {
            GenerateError::ProviderQuotaExceeded { .. } => true,
            GenerateError::AllProvidersFailed { last, .. } => last.is_quota(),
            _ => false,
        }
    }
}

/// Truncate `text` to at most [`SNIPPET_LEN`] characters for diagnostics.
pub(crate) fn snippet(text: &str) -> String {
    match text.char_indices().nth(SNIPPET_LEN) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
