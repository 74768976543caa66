mod normalize;
mod repair;
mod sanitize;

pub use normalize::{normalize, STEP_PLACEHOLDER, TIME_PLACEHOLDER};
pub use repair::repair;
pub use sanitize::sanitize;

use crate::error::{snippet, GenerateError};
use crate::model::Recipe;
use log::{debug, warn};
use serde_json::Value;

/// Turn raw model output into recipes: sanitize, repair, strict parse,
/// normalize.
pub fn parse_recipes(raw: &str) -> Result<Vec<Recipe>, GenerateError> {
    let sanitized = sanitize(raw);
    let repaired = repair(&sanitized);
    debug!("Repaired model output: {}", repaired);

    let parsed: Value = serde_json::from_str(&repaired).map_err(|e| {
        warn!("JSON parsing failed. Repaired JSON: {}", repaired);
        GenerateError::MalformedModelOutput {
            message: e.to_string(),
            snippet: snippet(&repaired),
        }
    })?;

    normalize(&parsed)
}
