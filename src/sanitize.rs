const FENCE: &str = "```";

/// Remove a markdown code fence wrapped around a model reply.
///
/// Only a leading opener (optionally followed by a language tag) and a
/// trailing closer are removed. Fences in the middle of the text are left
/// alone and balance is not checked.
pub fn strip_code_fences(response: &str) -> String {
    let mut cleaned = response.trim();

    if let Some(rest) = cleaned.strip_prefix(FENCE) {
        cleaned = strip_language_tag(rest);
    }
    if let Some(rest) = cleaned.strip_suffix(FENCE) {
        cleaned = rest;
    }

    cleaned.trim().to_string()
}

fn strip_language_tag(after_fence: &str) -> &str {
    if let Some(rest) = after_fence.strip_prefix("json") {
        return rest;
    }
    match after_fence.split_once('\n') {
        Some((tag, body)) if is_language_tag(tag.trim_end()) => body,
        _ => after_fence,
    }
}

fn is_language_tag(tag: &str) -> bool {
    tag.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '_' | '.'))
}
