//! Execute Workflow use case
//!
//! Registers workflow definitions and runs them against the tool catalog.
//!
//! # Execution
//!
//! ```text
//! ┌─────────────┐   ready steps    ┌──────────────┐   results   ┌───────────┐
//! │ Pending     │ ───────────────▶ │ Frontier     │ ──────────▶ │ Completed │
//! │ (all steps) │  (deps done,     │ (≤ max_      │             │ / Failed  │
//! └─────────────┘  decl. order)    │  parallel)   │             └───────────┘
//!                                  └──────────────┘
//! ```
//!
//! A step is ready once its `depends_on` steps and every step its bindings
//! reference have completed. By default a round holds a single step, so
//! steps run one by one in declaration order; a larger `max_parallel_steps`
//! launches up to that many ready steps concurrently.
//!
//! A thrown error stops the run once the round it happened in has finished:
//! results of steps that already completed are kept, nothing is rolled back,
//! and no further step starts. A tool that *returns* a `success: false`
//! envelope has not thrown; the envelope is stored like any other result.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use dashagent_domain::confirmation::{ConfirmationRequest, ConfirmationRequired, Severity};
use dashagent_domain::tool::{CONFIRMATION_ID_ARG, ErrorCategory, ToolArguments, ToolError};
use dashagent_domain::workflow::{
    CompiledStep, CompiledWorkflow, ResolutionScope, StepResults, StepState, Workflow, WorkflowError,
    WorkflowResult,
};
use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::confirmation_gate::ConfirmationGate;
use super::tool_helpers::{UNEXPECTED_ERROR_MESSAGE, invoke_tool, panic_message};
use crate::config::{EngineParams, UnresolvedBindingPolicy};
use crate::ports::tool_catalog::ToolCatalogPort;
use crate::ports::workflow_progress::{NoWorkflowProgress, WorkflowProgressNotifier};

/// Tool name recorded on a workflow-level confirmation
pub fn workflow_confirmation_tool(workflow_id: &str) -> String {
    format!("workflow:{}", workflow_id)
}

/// Registry and runner of workflows
pub struct WorkflowEngine {
    catalog: Arc<dyn ToolCatalogPort>,
    confirmations: Arc<ConfirmationGate>,
    params: EngineParams,
    workflows: RwLock<HashMap<String, Arc<CompiledWorkflow>>>,
}

enum StepOutcome {
    Completed(Value),
    Failed(ToolError),
}

impl WorkflowEngine {
    pub fn new(catalog: Arc<dyn ToolCatalogPort>, confirmations: Arc<ConfirmationGate>) -> Self {
        Self {
            catalog,
            confirmations,
            params: EngineParams::default(),
            workflows: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_params(mut self, params: EngineParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    // ==================== Registry ====================

    /// Validate and register; the id must not be taken
    pub fn register_workflow(&self, workflow: Workflow) -> Result<(), WorkflowError> {
        if self.has_workflow(&workflow.id) {
            return Err(WorkflowError::AlreadyRegistered(workflow.id));
        }
        let compiled = CompiledWorkflow::compile(workflow)?;

        let mut workflows = self.workflows.write().unwrap_or_else(PoisonError::into_inner);
        if workflows.contains_key(compiled.id()) {
            return Err(WorkflowError::AlreadyRegistered(compiled.id().to_string()));
        }
        debug!(workflow = compiled.id(), steps = compiled.len(), "Workflow registered");
        workflows.insert(compiled.id().to_string(), Arc::new(compiled));
        Ok(())
    }

    pub fn get_workflow(&self, id: &str) -> Option<Workflow> {
        self.compiled(id).map(|c| c.workflow().clone())
    }

    /// Registered workflows, sorted by id
    pub fn list_workflows(&self) -> Vec<Workflow> {
        let workflows = self.workflows.read().unwrap_or_else(PoisonError::into_inner);
        let mut list: Vec<Workflow> = workflows.values().map(|c| c.workflow().clone()).collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        list
    }

    pub fn has_workflow(&self, id: &str) -> bool {
        self.compiled(id).is_some()
    }

    pub fn workflow_count(&self) -> usize {
        self.workflows.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn compiled(&self, id: &str) -> Option<Arc<CompiledWorkflow>> {
        self.workflows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    // ==================== Execution ====================

    pub async fn execute_workflow(&self, id: &str, initial: ToolArguments) -> Result<WorkflowResult, WorkflowError> {
        self.execute_workflow_with_progress(id, initial, &NoWorkflowProgress).await
    }

    /// Run a registered workflow
    ///
    /// `Err` only for an unknown id; every step-level problem is reported
    /// inside the returned [`WorkflowResult`].
    pub async fn execute_workflow_with_progress(
        &self,
        id: &str,
        mut initial: ToolArguments,
        progress: &dyn WorkflowProgressNotifier,
    ) -> Result<WorkflowResult, WorkflowError> {
        let workflow = self
            .compiled(id)
            .ok_or_else(|| WorkflowError::NotFound(id.to_string()))?;

        if let Some(shadowing) = initial.keys().find(|key| workflow.has_step(key)) {
            warn!(workflow = id, param = %shadowing, "Initial parameter shadows a step result in bindings");
        }

        let start = Instant::now();

        if workflow.workflow().requires_confirmation {
            let supplied = initial
                .remove(CONFIRMATION_ID_ARG)
                .and_then(|v| v.as_str().map(str::to_string));
            match supplied {
                None => {
                    let result = self.request_workflow_confirmation(&workflow, &initial);
                    info!(workflow = id, "Workflow awaiting confirmation");
                    return Ok(result.with_execution_time(start.elapsed().as_millis() as u64));
                }
                Some(confirmation_id) => {
                    if !self.confirmations.confirm_action_with(
                        &confirmation_id,
                        &workflow_confirmation_tool(id),
                        &initial,
                        Severity::Medium,
                    ) {
                        warn!(workflow = id, confirmation_id = %confirmation_id, "Workflow confirmation rejected");
                        let error = ToolError::invalid_parameters(format!(
                            "Confirmation {} is expired, unknown or was issued for different parameters.",
                            confirmation_id
                        ));
                        return Ok(WorkflowResult::failed(StepResults::new(), error.user_message(), None)
                            .with_execution_time(start.elapsed().as_millis() as u64));
                    }
                }
            }
        }

        info!(workflow = id, steps = workflow.len(), "Workflow started");
        progress.on_workflow_start(id, workflow.len());

        let result = self
            .run(&workflow, &initial, progress)
            .await
            .with_execution_time(start.elapsed().as_millis() as u64);

        if result.success {
            info!(workflow = id, elapsed_ms = result.execution_time_ms, "Workflow completed");
        } else {
            warn!(
                workflow = id,
                failed_step = result.failed_step_id.as_deref().unwrap_or("-"),
                error = result.error.as_deref().unwrap_or(""),
                "Workflow did not complete"
            );
        }
        progress.on_workflow_complete(id, &result);
        Ok(result)
    }

    fn request_workflow_confirmation(&self, workflow: &CompiledWorkflow, initial: &ToolArguments) -> WorkflowResult {
        let definition = workflow.workflow();
        let request = ConfirmationRequest::new(
            "Run workflow",
            definition.name.clone(),
            Severity::Medium,
            workflow_confirmation_tool(&definition.id),
        )
        .with_params(initial.clone());
        let confirmation_id = self.confirmations.request_confirmation(request);

        match self.confirmations.get_pending(&confirmation_id) {
            Some(pending) => WorkflowResult::awaiting_confirmation(ConfirmationRequired::from_pending(&pending)),
            None => WorkflowResult::failed(
                StepResults::new(),
                "The confirmation request expired before it could be shown.",
                None,
            ),
        }
    }

    async fn run(
        &self,
        workflow: &CompiledWorkflow,
        initial: &ToolArguments,
        progress: &dyn WorkflowProgressNotifier,
    ) -> WorkflowResult {
        let total = workflow.len();
        let mut states: BTreeMap<String, StepState> = workflow
            .steps()
            .iter()
            .map(|s| (s.id().to_string(), StepState::Pending))
            .collect();
        let mut results = StepResults::new();
        let mut completed: HashSet<String> = HashSet::new();
        let mut failure: Option<(usize, String, String)> = None;
        let mut confirmation: Option<(String, ConfirmationRequired)> = None;

        loop {
            let frontier: Vec<&CompiledStep> = workflow
                .steps()
                .iter()
                .filter(|s| states.get(s.id()) == Some(&StepState::Pending) && s.is_ready(&completed))
                .take(self.params.parallelism())
                .collect();
            if frontier.is_empty() {
                break;
            }

            for step in &frontier {
                states.insert(step.id().to_string(), StepState::Executing);
                debug!(step = step.id(), tool = %step.step.tool_name, "Step started");
                progress.on_step_start(step.id(), step.index, total);
            }

            let prior = &results;
            let outcomes = join_all(frontier.iter().map(|step| self.run_step(step, initial, prior))).await;

            for (step, outcome) in frontier.iter().zip(outcomes) {
                match outcome {
                    StepOutcome::Completed(value) => {
                        states.insert(step.id().to_string(), StepState::Completed);
                        completed.insert(step.id().to_string());
                        progress.on_step_complete(step.id(), step.index, total, &value);
                        if confirmation.is_none() {
                            confirmation = confirmation_request(&value).map(|r| (step.id().to_string(), r));
                        }
                        results.insert(step.id().to_string(), value);
                    }
                    StepOutcome::Failed(err) => {
                        let message = err.user_message();
                        warn!(step = step.id(), category = %err.category, error = %err.message, "Step failed");
                        states.insert(step.id().to_string(), StepState::Failed);
                        progress.on_step_failed(step.id(), step.index, total, &message);
                        if failure.as_ref().is_none_or(|(index, _, _)| step.index < *index) {
                            failure = Some((step.index, step.id().to_string(), message));
                        }
                    }
                }
            }

            if failure.is_some() || confirmation.is_some() {
                break;
            }
        }

        if let Some((_, step_id, message)) = failure {
            return WorkflowResult::failed(results, message, Some(step_id)).with_step_states(states);
        }

        if let Some((step_id, request)) = confirmation {
            info!(step = %step_id, "Workflow halted awaiting confirmation");
            return WorkflowResult::failed(results, format!("Step '{}' requires confirmation before continuing.", step_id), None)
                .with_pending_confirmation(request)
                .with_step_states(states);
        }

        if completed.len() < total {
            let stalled = workflow
                .steps()
                .iter()
                .find(|s| !completed.contains(s.id()))
                .map(|s| s.id().to_string());
            return WorkflowResult::failed(
                results,
                ToolError::operation_failed("The workflow stopped before every step could run.").user_message(),
                stalled,
            )
            .with_step_states(states);
        }

        WorkflowResult::completed(results).with_step_states(states)
    }

    async fn run_step(&self, step: &CompiledStep, initial: &ToolArguments, prior: &StepResults) -> StepOutcome {
        match self.try_run_step(step, initial, prior).await {
            Ok(value) => StepOutcome::Completed(value),
            Err(err) => StepOutcome::Failed(err),
        }
    }

    async fn try_run_step(
        &self,
        step: &CompiledStep,
        initial: &ToolArguments,
        prior: &StepResults,
    ) -> Result<Value, ToolError> {
        if let Some(missing) = step.dependencies.iter().find(|dep| !prior.contains_key(*dep)) {
            return Err(ToolError::operation_failed(format!(
                "Step '{}' was scheduled before its dependency '{}' completed.",
                step.id(),
                missing
            )));
        }

        let resolved = step.bindings.resolve(&ResolutionScope::new(initial, prior));
        if !resolved.is_complete() {
            warn!(
                step = step.id(),
                unresolved = ?resolved.unresolved,
                policy = %self.params.unresolved_binding,
                "Unresolved template references"
            );
            if self.params.unresolved_binding == UnresolvedBindingPolicy::Fail {
                return Err(ToolError::invalid_parameters(format!(
                    "Unresolved reference in step '{}': {}.",
                    step.id(),
                    resolved.unresolved.join(", ")
                )));
            }
        }

        let tool = self.catalog.get(&step.step.tool_name).ok_or_else(|| {
            ToolError::operation_failed(format!(
                "Tool '{}' used by step '{}' is not registered.",
                step.step.tool_name,
                step.id()
            ))
        })?;

        let invocation = invoke_tool(tool.as_ref(), resolved.params).await;
        let elapsed_ms = invocation.elapsed_ms;
        let result = invocation.outcome.map_err(|e| e.into_tool_error())?;
        if !result.success {
            debug!(step = step.id(), error = result.error.as_deref().unwrap_or(""), "Step returned an unsuccessful result");
        }

        let raw = serde_json::to_value(result.backfill_execution_time(elapsed_ms)).map_err(|e| {
            ToolError::operation_failed(format!("Result of step '{}' is not serializable: {}", step.id(), e))
        })?;

        match &step.step.transform {
            None => Ok(raw),
            Some(transform) => match std::panic::catch_unwind(AssertUnwindSafe(|| transform.apply(&raw, prior))) {
                Ok(outcome) => outcome,
                Err(payload) => {
                    tracing::error!(step = step.id(), panic = %panic_message(payload.as_ref()), "Step transform panicked");
                    Err(ToolError::new(ErrorCategory::OperationFailed, UNEXPECTED_ERROR_MESSAGE, ""))
                }
            },
        }
    }
}

/// A `requiresConfirmation` payload in a stored step result
fn confirmation_request(value: &Value) -> Option<ConfirmationRequired> {
    value
        .get("data")
        .and_then(ConfirmationRequired::from_data)
        .or_else(|| ConfirmationRequired::from_data(value))
}
