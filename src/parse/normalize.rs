use crate::error::{snippet, GenerateError};
use crate::model::Recipe;
use serde_json::{Map, Value};

// Accepted keys per field, highest priority first. Matching ignores case.
const TITLE_KEYS: &[&str] = &["title", "name", "recipe"];
const TIME_KEYS: &[&str] = &["time", "duration", "cooking_time", "prep_time"];
const INGREDIENT_KEYS: &[&str] = &["ingredients", "ingredient"];
const STEP_KEYS: &[&str] = &["steps", "instructions", "method", "directions"];
const TIP_KEYS: &[&str] = &["tips", "tip", "notes", "note"];

/// Shown when the model gave no cooking time.
pub const TIME_PLACEHOLDER: &str = "Time not specified";

/// Single step used when the model gave ingredients but no instructions.
pub const STEP_PLACEHOLDER: &str = "Combine the ingredients and cook until done.";

/// Map a parsed model response onto strict recipes.
///
/// The top-level value must be an array. Entries that are not objects, have
/// no title, or have neither ingredients nor steps are skipped; an empty
/// result is an error.
pub fn normalize(parsed: &Value) -> Result<Vec<Recipe>, GenerateError> {
    let items = parsed
        .as_array()
        .ok_or(GenerateError::InvalidResponseShape)?;

    let recipes: Vec<Recipe> = items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(normalize_entry)
        .collect();

    if recipes.is_empty() {
        return Err(GenerateError::NoValidRecipes {
            snippet: snippet(&parsed.to_string()),
        });
    }

    Ok(recipes)
}

fn normalize_entry(entry: &Map<String, Value>) -> Option<Recipe> {
    let title = field(entry, TITLE_KEYS)
        .and_then(scalar_text)
        .filter(|t| !t.is_empty())?;

    let ingredients = field(entry, INGREDIENT_KEYS).map(lines).unwrap_or_default();
    let mut steps = field(entry, STEP_KEYS).map(lines).unwrap_or_default();
    if ingredients.is_empty() && steps.is_empty() {
        return None;
    }
    if steps.is_empty() {
        steps.push(STEP_PLACEHOLDER.to_string());
    }

    let time = field(entry, TIME_KEYS)
        .and_then(scalar_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| TIME_PLACEHOLDER.to_string());

    let tips = field(entry, TIP_KEYS)
        .map(|v| lines(v).join(" "))
        .unwrap_or_default();

    Some(Recipe {
        title,
        time,
        ingredients,
        steps,
        tips,
    })
}

/// First key of `keys` present in `entry`. A `null` value counts as absent.
fn field<'a>(entry: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| {
        entry
            .iter()
            .find(|(k, v)| k.trim().eq_ignore_ascii_case(key) && !v.is_null())
            .map(|(_, v)| v)
    })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// One line of a list: scalars as text, objects (e.g. `{"item": "rice",
/// "qty": "1 cup"}`) as their scalar values joined by spaces.
fn line(value: &Value) -> Option<String> {
    let text = match value {
        Value::Object(map) => map
            .values()
            .filter_map(scalar_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        other => scalar_text(other)?,
    };
    Some(text).filter(|t| !t.is_empty())
}

fn lines(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(line).collect(),
        Value::String(s) => s
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        other => line(other).into_iter().collect(),
    }
}
