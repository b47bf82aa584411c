//! Workflow progress port
//!
//! Defines the interface for reporting progress during workflow execution.

use dashagent_domain::workflow::WorkflowResult;
use serde_json::Value;

/// Callback for progress updates during a workflow run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, progress bars, logs).
pub trait WorkflowProgressNotifier: Send + Sync {
    /// Called once before any step runs
    fn on_workflow_start(&self, _workflow_id: &str, _total_steps: usize) {}

    fn on_step_start(&self, _step_id: &str, _index: usize, _total: usize) {}

    /// Called with the stored (possibly transformed) result of a step
    fn on_step_complete(&self, step_id: &str, index: usize, total: usize, result: &Value);

    fn on_step_failed(&self, _step_id: &str, _index: usize, _total: usize, _error: &str) {}

    fn on_workflow_complete(&self, _workflow_id: &str, _result: &WorkflowResult) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoWorkflowProgress;

impl WorkflowProgressNotifier for NoWorkflowProgress {
    fn on_step_complete(&self, _step_id: &str, _index: usize, _total: usize, _result: &Value) {}
}

/// Adapter: plain `(step_id, index, total, result)` callback
pub struct StepCallback<F>(pub F);

impl<F> WorkflowProgressNotifier for StepCallback<F>
where
    F: Fn(&str, usize, usize, &Value) + Send + Sync,
{
    fn on_step_complete(&self, step_id: &str, index: usize, total: usize, result: &Value) {
        (self.0)(step_id, index, total, result)
    }
}
