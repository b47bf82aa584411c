//! Service listing tool: list_services

use std::sync::Arc;

use async_trait::async_trait;
use dashagent_application::use_cases::tool_context::ToolContext;
use dashagent_domain::tool::{ToolDefinition, ToolError, ToolParameter, ToolResult, TypedTool};
use serde::{Deserialize, Serialize};

/// Tool name constant
pub const LIST_SERVICES: &str = "list_services";

/// Get the tool definition for list_services
pub fn list_services_definition() -> ToolDefinition {
    ToolDefinition::new(
        LIST_SERVICES,
        "List the enabled media services, optionally filtered by service type (e.g. 'radarr')",
    )
    .with_parameter(ToolParameter::new("serviceType", "Only list services of this type", false))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListServicesParams {
    #[serde(default)]
    pub service_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    pub id: String,
    pub service_type: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ListServicesOutput {
    pub services: Vec<ServiceSummary>,
    pub count: usize,
}

pub struct ListServicesTool {
    ctx: Arc<ToolContext>,
    definition: ToolDefinition,
}

impl ListServicesTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self {
            ctx,
            definition: list_services_definition(),
        }
    }
}

#[async_trait]
impl TypedTool for ListServicesTool {
    type Params = ListServicesParams;
    type Output = ListServicesOutput;

    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn run(&self, params: ListServicesParams) -> Result<ToolResult<ListServicesOutput>, ToolError> {
        let connectors = match params.service_type.as_deref().map(str::trim) {
            Some(service_type) if !service_type.is_empty() => self.ctx.connectors_by_type(service_type),
            _ => self.ctx.connectors().enabled(),
        };

        let services: Vec<ServiceSummary> = connectors
            .iter()
            .map(|c| {
                let d = c.descriptor();
                ServiceSummary {
                    id: d.id.clone(),
                    service_type: d.service_type.clone(),
                    name: d.name.clone(),
                }
            })
            .collect();

        Ok(ToolResult::success(ListServicesOutput {
            count: services.len(),
            services,
        }))
    }
}
