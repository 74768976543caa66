//! # jaldikhana
//!
//! Suggests quick, kid-friendly recipes from the ingredients a user already
//! has. The prompt goes to an LLM provider (Gemini, Grok or OpenAI, tried in
//! priority order) and the loosely formatted answer is repaired and normalised
//! into [`Recipe`] values.
//!
//! ```no_run
//! use jaldikhana::{AppConfig, RecipeGenerator};
//!
//! # async fn run() -> Result<(), jaldikhana::GenerateError> {
//! let config = AppConfig::load()?;
//! let generator = RecipeGenerator::from_config(&config);
//! let recipes = generator.generate("rice, dal, onion").await?;
//! for recipe in recipes {
//!     println!("{} ({})", recipe.title, recipe.time);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod parse;
pub mod providers;
pub mod server;

pub use crate::config::AppConfig;
pub use crate::error::GenerateError;
pub use crate::model::{recipes_to_plain_text, Recipe};
pub use crate::providers::{LlmProvider, RecipeGenerator};

/// Generate recipes using providers configured from the environment and
/// `config.toml`.
///
/// Long-running processes should build one [`RecipeGenerator`] at start-up
/// instead; this loads the configuration on every call.
pub async fn generate_recipes(prompt: &str) -> Result<Vec<Recipe>, GenerateError> {
    if prompt.trim().is_empty() {
        return Err(GenerateError::EmptyPrompt);
    }
    let config = AppConfig::load()?;
    RecipeGenerator::from_config(&config).generate(prompt).await
}
