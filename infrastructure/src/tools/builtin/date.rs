//! Date parsing tool: parse_date

use std::sync::Arc;

use async_trait::async_trait;
use dashagent_application::use_cases::tool_context::ToolContext;
use dashagent_domain::tool::{ToolDefinition, ToolError, ToolParameter, ToolResult, TypedTool};
use serde::{Deserialize, Serialize};

/// Tool name constant
pub const PARSE_DATE: &str = "parse_date";

/// Output format of the resolved date-time
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Get the tool definition for parse_date
pub fn parse_date_definition() -> ToolDefinition {
    ToolDefinition::new(
        PARSE_DATE,
        "Resolve a relative ('tomorrow', 'next week') or absolute date to an ISO date-time",
    )
    .with_parameter(ToolParameter::new("text", "The date to resolve", true))
}

#[derive(Debug, Deserialize)]
pub struct ParseDateParams {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ParseDateOutput {
    pub text: String,
    pub date: String,
}

pub struct ParseDateTool {
    ctx: Arc<ToolContext>,
    definition: ToolDefinition,
}

impl ParseDateTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self {
            ctx,
            definition: parse_date_definition(),
        }
    }
}

#[async_trait]
impl TypedTool for ParseDateTool {
    type Params = ParseDateParams;
    type Output = ParseDateOutput;

    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn run(&self, params: ParseDateParams) -> Result<ToolResult<ParseDateOutput>, ToolError> {
        let resolved = self.ctx.parse_relative_date(&params.text)?;
        Ok(ToolResult::success(ParseDateOutput {
            date: resolved.format(ISO_FORMAT).to_string(),
            text: params.text,
        }))
    }
}
