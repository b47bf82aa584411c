//! Application-level configuration.
//!
//! - [`EngineParams`]: step scheduling and unresolved-binding policy

pub mod engine_params;

pub use engine_params::{EngineParams, UnresolvedBindingPolicy};
