//! Workflow domain entities

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::confirmation::ConfirmationRequired;
use crate::tool::entities::ToolArguments;
use crate::tool::value_objects::ToolError;

use super::binding::StepResults;

type TransformFn = dyn Fn(&Value, &StepResults) -> Result<Value, ToolError> + Send + Sync;

/// Post-processing of a step's raw result before it is stored.
///
/// Receives the raw result (the tool's envelope as JSON) and the results of
/// the steps executed so far.
#[derive(Clone)]
pub struct StepTransform(Arc<TransformFn>);

impl StepTransform {
    pub fn new<F>(transform: F) -> Self
    where
        F: Fn(&Value, &StepResults) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        Self(Arc::new(transform))
    }

    /// Transform over the producer's typed `data` payload.
    ///
    /// Fails the step with `OPERATION_FAILED` when the payload does not have
    /// the shape `T` describes.
    pub fn typed<T, F>(transform: F) -> Self
    where
        T: DeserializeOwned,
        F: Fn(T, &StepResults) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        Self::new(move |raw, prior| {
            let data = raw.get("data").cloned().unwrap_or(Value::Null);
            let typed = serde_json::from_value::<T>(data).map_err(|e| {
                ToolError::operation_failed(format!(
                    "Step result does not have the expected shape: {}",
                    e
                ))
            })?;
            transform(typed, prior)
        })
    }

    pub fn apply(&self, raw: &Value, prior: &StepResults) -> Result<Value, ToolError> {
        (self.0)(raw, prior)
    }
}

impl std::fmt::Debug for StepTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StepTransform(..)")
    }
}

/// One node of a workflow: a tool invocation with bound parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// Unique within the workflow
    pub id: String,
    #[serde(rename = "tool")]
    pub tool_name: String,
    /// Literal values or `{{...}}` templates
    #[serde(default)]
    pub params: ToolArguments,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(skip)]
    pub transform: Option<StepTransform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl WorkflowStep {
    pub fn new(id: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tool_name: tool_name.into(),
            params: ToolArguments::new(),
            depends_on: Vec::new(),
            transform: None,
            description: None,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn depends_on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_transform(mut self, transform: StepTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A registered graph of tool invocations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub steps: Vec<WorkflowStep>,
    /// Ask the human before running any step
    #[serde(default)]
    pub requires_confirmation: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Workflow {
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            steps: Vec::new(),
            requires_confirmation: false,
            tags: Vec::new(),
        }
    }

    pub fn with_step(mut self, step: WorkflowStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn requiring_confirmation(mut self) -> Self {
        self.requires_confirmation = true;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn step(&self, id: &str) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.id == id)
    }
}

/// Lifecycle of a step within one execution
///
/// ```text
/// Pending ──> Executing ──> Completed
///                      └──> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
    Pending,
    Executing,
    Completed,
    Failed,
}

impl StepState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepState::Completed | StepState::Failed)
    }
}

/// Outcome of one workflow execution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResult {
    pub success: bool,
    /// Results of the steps that actually executed
    pub step_results: StepResults,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub failed_step_id: Option<String>,
    #[serde(rename = "executionTime")]
    pub execution_time_ms: u64,
    /// Set when the run stopped to wait for a human
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pending_confirmation: Option<ConfirmationRequired>,
    #[serde(default)]
    pub step_states: BTreeMap<String, StepState>,
}

impl WorkflowResult {
    pub fn completed(step_results: StepResults) -> Self {
        Self {
            success: true,
            step_results,
            error: None,
            failed_step_id: None,
            execution_time_ms: 0,
            pending_confirmation: None,
            step_states: BTreeMap::new(),
        }
    }

    pub fn failed(step_results: StepResults, error: impl Into<String>, failed_step_id: Option<String>) -> Self {
        Self {
            success: false,
            step_results,
            error: Some(error.into()),
            failed_step_id,
            execution_time_ms: 0,
            pending_confirmation: None,
            step_states: BTreeMap::new(),
        }
    }

    /// Nothing ran yet; the host must surface the prompt first
    pub fn awaiting_confirmation(confirmation: ConfirmationRequired) -> Self {
        Self {
            pending_confirmation: Some(confirmation),
            ..Self::completed(StepResults::new())
        }
    }

    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = ms;
        self
    }

    pub fn with_step_states(mut self, states: BTreeMap<String, StepState>) -> Self {
        self.step_states = states;
        self
    }

    pub fn with_pending_confirmation(mut self, confirmation: ConfirmationRequired) -> Self {
        self.pending_confirmation = Some(confirmation);
        self
    }

    pub fn is_awaiting_confirmation(&self) -> bool {
        self.pending_confirmation.is_some()
    }
}
