//! Media search results and their textual rendering

pub mod entities;
pub mod format;

pub use entities::SearchResult;
pub use format::{format_result, format_results};
