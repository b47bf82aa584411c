//! Tool catalog and built-in tools
//!
//! - `catalog`: the [`ToolCatalog`] registry (implements `ToolCatalogPort`)
//! - `schema`: [`ExternalTool`], the JSON-Schema adapter used by model hosts
//! - `builtin`: tools shipped with dashagent

pub mod builtin;

mod catalog;
mod schema;

pub use builtin::{builtin_tools, register_builtin_tools};
pub use catalog::ToolCatalog;
pub use schema::{ExternalTool, ExternalToolSchema, input_schema};
