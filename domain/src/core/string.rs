//! String utilities for the domain layer.

/// Truncate to at most `max_chars` characters, appending `...` when cut
///
/// Counts characters, not bytes, so multi-byte text is never split.
pub fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s.to_string(),
        Some((end, _)) => format!("{}...", &s[..end]),
    }
}

/// First line of a possibly multi-line message
pub fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("").trim_end()
}
