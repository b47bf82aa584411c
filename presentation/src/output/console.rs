//! Console output formatter for tools, services, workflows and results

use colored::Colorize;
use dashagent_application::ports::connector_directory::ConnectorDescriptor;
use dashagent_domain::confirmation::PendingConfirmation;
use dashagent_domain::core::string::truncate;
use dashagent_domain::tool::ToolResult;
use dashagent_domain::workflow::{StepState, Workflow, WorkflowResult};
use serde::Serialize;
use serde_json::Value;

/// Longest step result preview in the full workflow view
const PREVIEW_CHARS: usize = 200;

/// Formats orchestration data for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format as pretty JSON
    pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Tool list from external-format schemas (`{name, description, input_schema}`)
    pub fn format_tools(schemas: &[Value]) -> String {
        if schemas.is_empty() {
            return "No tools registered.\n".dimmed().to_string();
        }

        let mut output = Self::section_header(&format!("Tools ({})", schemas.len()));
        for schema in schemas {
            let name = schema["name"].as_str().unwrap_or("?");
            let description = schema["description"].as_str().unwrap_or("");
            output.push_str(&format!("\n{}\n  {}\n", name.yellow().bold(), description));

            let required: Vec<&str> = schema["input_schema"]["required"]
                .as_array()
                .map(|r| r.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            if let Some(properties) = schema["input_schema"]["properties"].as_object() {
                for (param, spec) in properties {
                    let marker = if required.contains(&param.as_str()) {
                        "*".red().to_string()
                    } else {
                        " ".to_string()
                    };
                    output.push_str(&format!(
                        "  {}{} {} {}\n",
                        marker,
                        param.cyan(),
                        format!("({})", spec["type"].as_str().unwrap_or("any")).dimmed(),
                        spec["description"].as_str().unwrap_or("")
                    ));
                }
            }
        }
        output
    }

    pub fn format_services(services: &[ConnectorDescriptor]) -> String {
        if services.is_empty() {
            return "No services configured. Add [[services]] entries to dashagent.toml.\n"
                .dimmed()
                .to_string();
        }

        let mut output = Self::section_header(&format!("Services ({})", services.len()));
        for service in services {
            let state = if service.enabled {
                "enabled".green()
            } else {
                "disabled".red()
            };
            output.push_str(&format!(
                "  {} {} {} {}\n",
                service.id.yellow().bold(),
                format!("[{}]", service.service_type).cyan(),
                service.name,
                state
            ));
            if !service.base_url.is_empty() {
                output.push_str(&format!("      {}\n", service.base_url.dimmed()));
            }
        }
        output
    }

    pub fn format_workflows(workflows: &[Workflow]) -> String {
        if workflows.is_empty() {
            return "No workflows registered.\n".dimmed().to_string();
        }

        let mut output = Self::section_header(&format!("Workflows ({})", workflows.len()));
        for workflow in workflows {
            let mut title = format!("{} {}", workflow.id.yellow().bold(), workflow.name);
            if workflow.requires_confirmation {
                title.push_str(&format!(" {}", "(requires confirmation)".red()));
            }
            output.push_str(&format!("\n{}\n", title));
            if !workflow.description.is_empty() {
                output.push_str(&format!("  {}\n", workflow.description));
            }
            if !workflow.tags.is_empty() {
                output.push_str(&format!("  {} {}\n", "tags:".dimmed(), workflow.tags.join(", ")));
            }
            for step in &workflow.steps {
                let deps = if step.depends_on.is_empty() {
                    String::new()
                } else {
                    format!(" <- {}", step.depends_on.join(", ")).dimmed().to_string()
                };
                output.push_str(&format!("  - {} {}{}\n", step.id.cyan(), step.tool_name, deps));
            }
        }
        output
    }

    pub fn format_pending(pending: &[PendingConfirmation]) -> String {
        let mut output = String::new();
        for entry in pending {
            output.push_str(&format!(
                "  {} {} {} {} {}\n",
                entry.confirmation_id.yellow(),
                format!("[{}]", entry.severity).red(),
                entry.action,
                entry.target,
                format!("expires {}", entry.expires_at.format("%H:%M:%S")).dimmed()
            ));
        }
        output
    }

    /// Single tool invocation envelope
    pub fn format_tool_result(tool: &str, result: &ToolResult) -> String {
        let mut output = String::new();
        if result.success {
            output.push_str(&format!("{} {}", "v".green(), tool.bold()));
        } else {
            output.push_str(&format!("{} {}", "x".red(), tool.bold()));
        }
        if let Some(ms) = result.execution_time_ms() {
            output.push_str(&format!(" {}", format!("({} ms)", ms).dimmed()));
        }
        output.push('\n');

        if let Some(error) = result.error() {
            output.push_str(&format!("{}\n", Self::indent(error, "  ").red()));
        }
        if let Some(data) = result.data() {
            if let Some(prompt) = data.get("confirmationPrompt").and_then(Value::as_str) {
                output.push_str(&format!("{}\n", prompt.yellow().bold()));
            }
            output.push_str(&Self::indent(&Self::format_json(data), "  "));
            output.push('\n');
        }
        output
    }

    /// Full workflow result: one line per step, then the outcome
    pub fn format_workflow_result(workflow_id: &str, result: &WorkflowResult) -> String {
        let mut output = Self::header(&format!("Workflow {}", workflow_id));
        output.push('\n');

        for (step_id, state) in &result.step_states {
            let marker = match state {
                StepState::Completed => "v".green(),
                StepState::Failed => "x".red(),
                StepState::Executing => "~".yellow(),
                StepState::Pending => "-".dimmed(),
            };
            output.push_str(&format!("{} {} {}\n", marker, step_id.bold(), format!("{:?}", state).dimmed()));
            if let Some(value) = result.step_results.get(step_id) {
                let preview = truncate(&value.to_string(), PREVIEW_CHARS);
                output.push_str(&format!("    {}\n", preview.dimmed()));
            }
        }

        output.push('\n');
        if let Some(pending) = &result.pending_confirmation {
            output.push_str(&format!("{} {}\n", "Confirmation required:".yellow().bold(), pending.confirmation_prompt));
        } else if result.success {
            output.push_str(&format!("{}\n", "Workflow completed".green().bold()));
        } else {
            output.push_str(&format!(
                "{} {}\n",
                "Workflow failed:".red().bold(),
                result.error.as_deref().unwrap_or("Unknown")
            ));
            if let Some(step) = &result.failed_step_id {
                output.push_str(&format!("  {} {}\n", "failed step:".dimmed(), step));
            }
        }
        output.push_str(&format!("{}\n", format!("{} ms", result.execution_time_ms).dimmed()));
        output.push_str(&Self::footer());
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
