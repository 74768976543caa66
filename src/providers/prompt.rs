/// The fixed instruction sent with every request.
///
/// Loaded from `prompt.txt` at compile time using `include_str!` so the
/// wording can be edited without dealing with Rust string syntax.
pub const BASE_PROMPT: &str = include_str!("prompt.txt");

/// Shape the model is asked to answer with.
pub const EXPECTED_JSON_SCHEMA: &str = r#"[
  {
    "title": "string",
    "time": "string (e.g. 20 mins)",
    "ingredients": ["string"],
    "steps": ["string"],
    "tips": "string"
  }
]"#;

/// Build the full prompt for a user request. The user input always comes last.
pub fn build_prompt(user_input: &str) -> String {
    format!(
        "{}\n\nFormat exactly like this (JSON array only):\n{}\n\nIMPORTANT: Use ONLY the ingredients mentioned by the user. Do NOT add any extra ingredients.\n\nUser request: {}",
        BASE_PROMPT.trim(),
        EXPECTED_JSON_SCHEMA,
        user_input
    )
}
