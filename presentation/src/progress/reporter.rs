//! Progress reporting for workflow execution

use colored::Colorize;
use dashagent_application::ports::workflow_progress::WorkflowProgressNotifier;
use dashagent_domain::workflow::WorkflowResult;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::sync::{Mutex, PoisonError};

/// Reports workflow progress with a progress bar
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self { bar: Mutex::new(None) }
    }

    fn workflow_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Some(bar) = self.bar.lock().unwrap_or_else(PoisonError::into_inner).as_ref() {
            f(bar);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowProgressNotifier for ProgressReporter {
    fn on_workflow_start(&self, workflow_id: &str, total_steps: usize) {
        let bar = ProgressBar::new(total_steps as u64);
        bar.set_style(Self::workflow_style());
        bar.set_prefix(workflow_id.to_string());
        bar.set_message("Starting...");
        *self.bar.lock().unwrap_or_else(PoisonError::into_inner) = Some(bar);
    }

    fn on_step_start(&self, step_id: &str, _index: usize, _total: usize) {
        self.with_bar(|bar| bar.set_message(format!("{} ...", step_id)));
    }

    fn on_step_complete(&self, step_id: &str, _index: usize, _total: usize, _result: &Value) {
        self.with_bar(|bar| {
            bar.set_message(format!("{} {}", "v".green(), step_id));
            bar.inc(1);
        });
    }

    fn on_step_failed(&self, step_id: &str, _index: usize, _total: usize, _error: &str) {
        self.with_bar(|bar| bar.set_message(format!("{} {}", "x".red(), step_id)));
    }

    fn on_workflow_complete(&self, _workflow_id: &str, result: &WorkflowResult) {
        if let Some(bar) = self.bar.lock().unwrap_or_else(PoisonError::into_inner).take() {
            if result.is_awaiting_confirmation() {
                bar.abandon_with_message(format!("{}", "awaiting confirmation".yellow()));
            } else if result.success {
                bar.finish_with_message(format!("{}", "complete!".green()));
            } else {
                bar.abandon_with_message(format!("{}", "failed".red()));
            }
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl WorkflowProgressNotifier for SimpleProgress {
    fn on_workflow_start(&self, workflow_id: &str, total_steps: usize) {
        println!("{} {} ({} steps)", "->".cyan(), workflow_id.bold(), total_steps);
    }

    fn on_step_complete(&self, step_id: &str, index: usize, total: usize, _result: &Value) {
        println!("  {} [{}/{}] {}", "v".green(), index + 1, total, step_id);
    }

    fn on_step_failed(&self, step_id: &str, index: usize, total: usize, error: &str) {
        println!("  {} [{}/{}] {} ({})", "x".red(), index + 1, total, step_id, error);
    }

    fn on_workflow_complete(&self, _workflow_id: &str, _result: &WorkflowResult) {
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashagent_domain::workflow::StepResults;
    use serde_json::json;

    #[test]
    fn test_reporter_lifecycle_without_start_is_noop() {
        let reporter = ProgressReporter::new();
        reporter.on_step_complete("a", 0, 1, &json!({}));
        reporter.on_workflow_complete("wf", &WorkflowResult::completed(StepResults::new()));
    }

    #[test]
    fn test_reporter_tracks_steps() {
        let reporter = ProgressReporter::new();
        reporter.on_workflow_start("wf", 2);
        reporter.on_step_start("a", 0, 2);
        reporter.on_step_complete("a", 0, 2, &json!({}));

        let position = reporter.bar.lock().unwrap().as_ref().map(|b| b.position());
        assert_eq!(position, Some(1));

        reporter.on_workflow_complete("wf", &WorkflowResult::completed(StepResults::new()));
        assert!(reporter.bar.lock().unwrap().is_none());
    }
}
