/// Positional cleanup of raw model output before repair.
///
/// Normalises line endings, unwraps a fully fenced code block (optionally
/// tagged `json`) and cuts the text down to the span from the first `[` to
/// the last `]`. No parsing happens here.
pub fn sanitize(raw: &str) -> String {
    let text = raw.trim().replace("\r\n", "\n").replace('\r', "\n");
    let text = strip_code_fence(&text).unwrap_or(&text);
    extract_array(text).to_string()
}

fn strip_code_fence(text: &str) -> Option<&str> {
    let inner = text.strip_prefix("```")?.strip_suffix("```")?;
    let inner = inner
        .strip_prefix("json")
        .or_else(|| inner.strip_prefix("JSON"))
        .unwrap_or(inner);
    Some(inner.trim())
}

/// An unclosed array (truncated output) is kept up to the end of the text.
fn extract_array(text: &str) -> &str {
    match text.find('[') {
        Some(start) => match text.rfind(']') {
            Some(end) if end > start => &text[start..=end],
            _ => &text[start..],
        },
        None => text,
    }
}
