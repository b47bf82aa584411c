//! Default wiring of the orchestration core
//!
//! [`OrchestrationRuntime`] builds every component from a [`FileConfig`]:
//! connector directory, fan-out search, confirmation gate, tool context,
//! tool catalog with the built-in tools, and the workflow engine with the
//! configured workflows registered.

use std::sync::Arc;

use dashagent_application::ports::connector_directory::ConnectorDirectory;
use dashagent_application::ports::workflow_progress::{NoWorkflowProgress, WorkflowProgressNotifier};
use dashagent_application::use_cases::confirmation_gate::ConfirmationGate;
use dashagent_application::use_cases::execute_workflow::WorkflowEngine;
use dashagent_application::use_cases::fan_out_search::FanOutSearch;
use dashagent_application::use_cases::tool_context::ToolContext;
use dashagent_domain::tool::{ToolArguments, ToolError, ToolResult};
use dashagent_domain::workflow::{Workflow, WorkflowError, WorkflowResult};
use serde_json::Value;
use thiserror::Error;

use crate::config::{ConfigValidationError, FileConfig};
use crate::connectors::ConfiguredConnectorDirectory;
use crate::tools::{ToolCatalog, register_builtin_tools};

/// Errors building the runtime
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("invalid configuration: {}", join_issues(.0))]
    InvalidConfig(Vec<ConfigValidationError>),

    #[error("workflow from configuration rejected: {0}")]
    Workflow(#[from] WorkflowError),
}

fn join_issues(issues: &[ConfigValidationError]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Fully wired orchestration core
pub struct OrchestrationRuntime {
    directory: Arc<dyn ConnectorDirectory>,
    confirmations: Arc<ConfirmationGate>,
    context: Arc<ToolContext>,
    catalog: Arc<ToolCatalog>,
    engine: WorkflowEngine,
}

impl OrchestrationRuntime {
    /// Build from configuration with descriptor-only connectors
    pub fn from_config(config: &FileConfig) -> Result<Self, RuntimeError> {
        let directory = ConfiguredConnectorDirectory::from_descriptors(
            config.services.iter().map(|s| s.to_descriptor()),
        );
        Self::with_directory(config, Arc::new(directory))
    }

    /// Build from configuration around a host-provided connector directory
    pub fn with_directory(
        config: &FileConfig,
        directory: Arc<dyn ConnectorDirectory>,
    ) -> Result<Self, RuntimeError> {
        let issues = config.validate();
        if !issues.is_empty() {
            return Err(RuntimeError::InvalidConfig(issues));
        }

        let confirmations = Arc::new(ConfirmationGate::new(config.confirmation.ttl()));
        let search = Arc::new(FanOutSearch::new(Arc::clone(&directory)));
        let context = Arc::new(ToolContext::new(
            Arc::clone(&directory),
            search,
            Arc::clone(&confirmations),
        ));

        let catalog = Arc::new(ToolCatalog::new());
        register_builtin_tools(&catalog, Arc::clone(&context));

        let engine = WorkflowEngine::new(catalog.clone(), Arc::clone(&confirmations))
            .with_params(config.workflow.to_engine_params());
        for workflow in &config.workflows {
            engine.register_workflow(workflow.clone())?;
        }

        tracing::info!(
            services = directory.all().len(),
            tools = catalog.count(),
            workflows = engine.workflow_count(),
            "Orchestration runtime ready"
        );

        Ok(Self {
            directory,
            confirmations,
            context,
            catalog,
            engine,
        })
    }

    pub fn catalog(&self) -> &Arc<ToolCatalog> {
        &self.catalog
    }

    pub fn context(&self) -> &Arc<ToolContext> {
        &self.context
    }

    pub fn confirmations(&self) -> &Arc<ConfirmationGate> {
        &self.confirmations
    }

    pub fn directory(&self) -> &Arc<dyn ConnectorDirectory> {
        &self.directory
    }

    pub fn engine(&self) -> &WorkflowEngine {
        &self.engine
    }

    pub fn register_workflow(&self, workflow: Workflow) -> Result<(), WorkflowError> {
        self.engine.register_workflow(workflow)
    }

    /// Invoke one tool through the external adapter
    ///
    /// An unknown name is reported the way any other tool failure is.
    pub async fn call_tool(&self, name: &str, args: Value) -> ToolResult {
        match self.catalog.external(name) {
            Some(tool) => tool.invoke(args).await,
            None => ToolResult::from(ToolError::invalid_parameters(format!("Unknown tool '{}'.", name)))
                .with_extra("toolName", name.to_string()),
        }
    }

    pub async fn run_workflow(&self, id: &str, params: ToolArguments) -> Result<WorkflowResult, WorkflowError> {
        self.run_workflow_with_progress(id, params, &NoWorkflowProgress).await
    }

    pub async fn run_workflow_with_progress(
        &self,
        id: &str,
        params: ToolArguments,
        progress: &dyn WorkflowProgressNotifier,
    ) -> Result<WorkflowResult, WorkflowError> {
        self.engine.execute_workflow_with_progress(id, params, progress).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::testing::{StaticConnector, descriptor};
    use dashagent_domain::media::SearchResult;
    use dashagent_domain::tool::{FnTool, ParamType, ToolDefinition, ToolParameter};
    use serde_json::json;

    const CONFIG: &str = r#"
[workflow]
max_parallel_steps = 2

[[services]]
id = "radarr-main"
type = "radarr"
name = "Radarr"

[[workflows]]
id = "search-and-add"
name = "Search and add"

[[workflows.steps]]
id = "search"
tool = "search_media"
params = { query = "{{query}}", limit = 1 }

[[workflows.steps]]
id = "add"
tool = "add_media"
depends_on = ["search"]
params = { title = "{{search.data.results[0].title}}" }
"#;

    fn runtime() -> OrchestrationRuntime {
        let config: FileConfig = toml::from_str(CONFIG).unwrap();
        let directory = ConfiguredConnectorDirectory::from_descriptors(
            config.services.iter().map(|s| s.to_descriptor()),
        )
        .with_connector(StaticConnector::new(
            "radarr-main",
            "radarr",
            vec![SearchResult::new("Dune", "movie", "Radarr").with_year(2021)],
        ));
        OrchestrationRuntime::with_directory(&config, Arc::new(directory)).unwrap()
    }

    #[test]
    fn test_from_config_wires_everything() {
        let config: FileConfig = toml::from_str(CONFIG).unwrap();
        let runtime = OrchestrationRuntime::from_config(&config).unwrap();

        assert_eq!(runtime.catalog().count(), 5);
        assert!(runtime.engine().has_workflow("search-and-add"));
        assert_eq!(runtime.engine().params().max_parallel_steps, 2);
        assert_eq!(runtime.directory().all().len(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = FileConfig::default();
        config.workflow.max_parallel_steps = 0;

        let err = OrchestrationRuntime::from_config(&config).err().unwrap();
        assert!(matches!(err, RuntimeError::InvalidConfig(_)));
        assert!(err.to_string().contains("max_parallel_steps"));
    }

    #[test]
    fn test_invalid_workflow_rejected() {
        let mut config = FileConfig::default();
        config.workflows.push(Workflow::new("empty", "Empty", ""));

        let err = OrchestrationRuntime::from_config(&config).err().unwrap();
        assert!(matches!(err, RuntimeError::Workflow(WorkflowError::InvalidDefinition { .. })));
    }

    #[tokio::test]
    async fn test_call_unknown_tool() {
        let result = runtime().call_tool("teleport", json!({})).await;
        assert!(!result.success);
        assert!(result.error().unwrap().contains("Unknown tool 'teleport'"));
    }

    #[tokio::test]
    async fn test_search_and_add_end_to_end() {
        let runtime = runtime();
        runtime
            .catalog()
            .register(FnTool::new(
                ToolDefinition::new("add_media", "Add a title to the library")
                    .with_parameter(ToolParameter::new("title", "Title", true).with_type(ParamType::String)),
                |args| async move { Ok(ToolResult::success(json!({"added": args["title"]}))) },
            ))
            .unwrap();

        let params = json!({"query": "dune"}).as_object().cloned().unwrap();
        let result = runtime.run_workflow("search-and-add", params).await.unwrap();

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.step_results["add"]["data"]["added"], "Dune");
        assert_eq!(result.step_results["search"]["data"]["count"], 1);
    }
}
