//! Human-readable rendering of search results

use crate::core::string::truncate;

use super::entities::SearchResult;

/// Overview text is cut to this many characters
pub const OVERVIEW_MAX_CHARS: usize = 150;

/// `Title (Year) [type] via Service (status) Rating: x/10`, then the
/// overview on the next line
pub fn format_result(result: &SearchResult) -> String {
    let mut line = format!(
        "{} [{}] via {}",
        result.display_title(),
        result.media_type,
        result.service_name
    );
    if let Some(status) = &result.status {
        line.push_str(&format!(" ({})", status));
    }
    if let Some(rating) = result.rating {
        line.push_str(&format!(" Rating: {:.1}/10", rating));
    }
    if let Some(overview) = result.overview.as_deref().filter(|o| !o.is_empty()) {
        line.push('\n');
        line.push_str(&truncate(overview, OVERVIEW_MAX_CHARS));
    }
    line
}

/// Numbered list of at most `max` results
pub fn format_results(results: &[SearchResult], max: usize) -> String {
    if results.is_empty() {
        return "No results found.".to_string();
    }

    let mut out = results
        .iter()
        .take(max)
        .enumerate()
        .map(|(i, r)| format!("{}. {}", i + 1, format_result(r)))
        .collect::<Vec<_>>()
        .join("\n\n");

    if results.len() > max {
        out.push_str(&format!("\n\n...and {} more", results.len() - max));
    }
    out
}
