//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;

/// Output format for workflow results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Step-by-step summary
    Full,
    /// JSON output
    Json,
}

/// CLI arguments for dashagent
#[derive(Parser, Debug)]
#[command(name = "dashagent")]
#[command(author, version, about = "Tool orchestration for media-server agents")]
#[command(long_about = r#"
dashagent exposes a catalog of tools to model hosts and runs declarative
multi-step workflows over them.

Configuration files are loaded from (in priority order):
1. DASHAGENT_* environment variables (e.g. DASHAGENT_WORKFLOW__MAX_PARALLEL_STEPS=1)
2. --config <path>        Explicit config file
3. ./dashagent.toml       Project-level config
4. ~/.config/dashagent/config.toml   Global config

Example:
  dashagent tools --json
  dashagent call search_media --args '{"query": "Dune"}'
  dashagent run search-and-add -p query=Dune
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Approve confirmation prompts without asking
    #[arg(short, long, global = true)]
    pub yes: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List registered tools
    Tools {
        /// Print the JSON-Schema tool descriptions
        #[arg(long)]
        json: bool,
    },

    /// List configured media services
    Services,

    /// List registered workflows
    Workflows,

    /// Invoke a single tool
    Call {
        /// Tool name
        tool: String,

        /// Arguments as a JSON object
        #[arg(short, long, value_name = "JSON", value_parser = parse_json_object)]
        args: Option<Value>,
    },

    /// Run a workflow
    Run {
        /// Workflow id
        workflow: String,

        /// Initial parameter (can be specified multiple times)
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
        params: Vec<(String, Value)>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "full")]
        output: OutputFormat,
    },

    /// Show configuration file locations and the effective settings
    ShowConfig,
}

/// Parse `key=value`; the value is read as JSON when it parses, else as text
pub fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty parameter name in '{}'", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn parse_json_object(raw: &str) -> Result<Value, String> {
    match serde_json::from_str(raw) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err("arguments must be a JSON object".to_string()),
        Err(e) => Err(format!("invalid JSON: {}", e)),
    }
}
