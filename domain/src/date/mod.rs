//! Date helpers for tool parameters

pub mod relative;

pub use relative::{RELATIVE_PHRASES, parse_relative_date};
