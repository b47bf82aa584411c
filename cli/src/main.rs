//! CLI entrypoint for dashagent
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use dashagent_application::ports::workflow_progress::{NoWorkflowProgress, WorkflowProgressNotifier};
use dashagent_application::use_cases::execute_workflow::workflow_confirmation_tool;
use dashagent_domain::confirmation::ConfirmationRequired;
use dashagent_domain::tool::{CONFIRMATION_ID_ARG, ToolArguments, ToolResult};
use dashagent_infrastructure::{ConfigLoader, FileConfig, OrchestrationRuntime};
use dashagent_presentation::{Cli, Command, ConsoleFormatter, OutputFormat, ProgressReporter};
use serde_json::{Value, json};
use std::io::{self, IsTerminal, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first so [logging] level can apply
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => config
            .logging
            .level
            .as_deref()
            .and_then(|level| EnvFilter::try_new(level).ok())
            .unwrap_or_else(|| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting dashagent");

    if let Command::ShowConfig = cli.command {
        show_config(&cli, &config);
        return Ok(());
    }

    // === Dependency Injection ===
    let runtime = OrchestrationRuntime::from_config(&config)?;

    match &cli.command {
        Command::Tools { json } => {
            let schemas: Vec<Value> = runtime
                .catalog()
                .to_external_format()
                .iter()
                .map(|tool| tool.to_json())
                .collect();
            if *json {
                println!("{}", ConsoleFormatter::format_json(&schemas));
            } else {
                print!("{}", ConsoleFormatter::format_tools(&schemas));
            }
        }
        Command::Services => {
            let services: Vec<_> = runtime
                .directory()
                .all()
                .iter()
                .map(|c| c.descriptor().clone())
                .collect();
            print!("{}", ConsoleFormatter::format_services(&services));
        }
        Command::Workflows => {
            print!("{}", ConsoleFormatter::format_workflows(&runtime.engine().list_workflows()));
        }
        Command::Call { tool, args } => {
            call_tool(&cli, &runtime, tool, args.clone()).await?;
        }
        Command::Run {
            workflow,
            params,
            output,
        } => {
            let initial: ToolArguments = params.iter().cloned().collect();
            run_workflow(&cli, &runtime, workflow, initial, *output).await?;
        }
        Command::ShowConfig => {}
    }

    Ok(())
}

async fn call_tool(cli: &Cli, runtime: &OrchestrationRuntime, tool: &str, args: Option<Value>) -> Result<()> {
    let mut args = match args {
        Some(Value::Object(map)) => map,
        _ => ToolArguments::new(),
    };

    let mut result = runtime.call_tool(tool, Value::Object(args.clone())).await;
    if let Some(request) = confirmation_request(&result) {
        if !confirm(cli, &request.confirmation_prompt)? {
            runtime.confirmations().cancel_action(&request.confirmation_id);
            println!("Cancelled.");
            return Ok(());
        }
        args.insert(CONFIRMATION_ID_ARG.to_string(), json!(request.confirmation_id));
        result = runtime.call_tool(tool, Value::Object(args)).await;
    }

    print!("{}", ConsoleFormatter::format_tool_result(tool, &result));
    if !result.success {
        bail!("Tool '{}' failed", tool);
    }
    Ok(())
}

async fn run_workflow(
    cli: &Cli,
    runtime: &OrchestrationRuntime,
    workflow: &str,
    mut initial: ToolArguments,
    output: OutputFormat,
) -> Result<()> {
    let reporter = ProgressReporter::new();
    let progress: &dyn WorkflowProgressNotifier = if cli.quiet || output == OutputFormat::Json {
        &NoWorkflowProgress
    } else {
        &reporter
    };

    let mut result = runtime
        .run_workflow_with_progress(workflow, initial.clone(), progress)
        .await?;

    // Only the workflow-level gate can be answered by re-running
    if let Some(pending) = result.pending_confirmation.clone() {
        let owner = runtime
            .confirmations()
            .get_pending(&pending.confirmation_id)
            .map(|p| p.tool_name);
        if owner.as_deref() == Some(workflow_confirmation_tool(workflow).as_str()) {
            if confirm(cli, &pending.confirmation_prompt)? {
                initial.insert(CONFIRMATION_ID_ARG.to_string(), json!(pending.confirmation_id));
                result = runtime.run_workflow_with_progress(workflow, initial, progress).await?;
            } else {
                runtime.confirmations().cancel_action(&pending.confirmation_id);
                println!("Cancelled.");
                return Ok(());
            }
        }
    }

    match output {
        OutputFormat::Full => print!("{}", ConsoleFormatter::format_workflow_result(workflow, &result)),
        OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&result)),
    }

    if !result.success {
        bail!("Workflow '{}' did not complete", workflow);
    }
    Ok(())
}

fn confirmation_request(result: &ToolResult) -> Option<ConfirmationRequired> {
    result.data().and_then(ConfirmationRequired::from_data)
}

/// Ask the human on the terminal; a non-terminal stdin declines
fn confirm(cli: &Cli, prompt: &str) -> Result<bool> {
    println!("{}", prompt);
    if cli.yes {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Ok(false);
    }

    print!("Proceed? [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn show_config(cli: &Cli, config: &FileConfig) {
    println!("Configuration sources (in priority order):");
    if cli.no_config {
        println!("  (--no-config: built-in defaults only)");
    } else {
        for source in ConfigLoader::config_sources(cli.config.as_ref()) {
            let mark = if source.found { "FOUND" } else { "     " };
            println!("  [{}] {:<12} {}", mark, format!("{}:", source.label), source.location);
        }
    }

    let issues = config.validate();
    if !issues.is_empty() {
        println!();
        println!("Validation issues:");
        for issue in &issues {
            println!("  - {}", issue);
        }
    }

    println!();
    println!("Effective configuration:");
    println!("{}", ConsoleFormatter::format_json(config));
}
