//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use relay_application::DetectionPolicy;
use std::path::PathBuf;

/// Output format for generation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// The merged answer as plain text
    #[default]
    Text,
    /// The full outcome (text, state, providers, counters) as JSON
    Json,
}

/// CLI arguments for llm-relay
#[derive(Parser, Debug)]
#[command(name = "llm-relay")]
#[command(
    author,
    version,
    about = "Provider-failover LLM relay with automatic continuation of truncated answers"
)]
#[command(long_about = r#"
llm-relay sends a prompt to the best available text-generation provider,
detects answers that stop mid-thought, and asks for the rest until the
answer is whole or the attempt budget runs out. A provider that fails is
replaced by the next candidate; excluded providers are never used.

Configuration files are loaded from (in priority order):
1. --config <path>                        Explicit config file
2. ./llm-relay.toml or ./.llm-relay.toml  Project-level config
3. ~/.config/llm-relay/config.toml        Global config

Example:
  llm-relay generate "Explain ownership in Rust" --model gpt-4o
  echo "Summarize this" | llm-relay generate --stream
  llm-relay exclusions add flaky-provider
  llm-relay providers --model claude-sonnet-4
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration sources and the effective configuration, then exit
    #[arg(long)]
    pub show_config: bool,

    /// Never request continuations, whatever the configuration says
    #[arg(long, global = true)]
    pub disable_auto_continue: bool,

    /// Model that judges whether an answer is complete
    #[arg(long, global = true, value_name = "MODEL")]
    pub completion_model: Option<String>,

    /// Maximum continuation calls per request
    #[arg(long, global = true, value_name = "N")]
    pub continuation_attempts: Option<u32>,

    /// How heuristics and the judge combine: conjunctive, heuristic-only, judge-preferred
    #[arg(long, global = true, value_name = "POLICY")]
    pub detection_policy: Option<DetectionPolicy>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate an answer, continuing it until complete
    Generate(GenerateArgs),

    /// Manage the persistent provider exclusion list
    Exclusions {
        #[command(subcommand)]
        action: ExclusionCommand,
    },

    /// List providers ranked for a model
    Providers {
        /// Rank for this model (default: the default generation model)
        #[arg(short, long, value_name = "MODEL")]
        model: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// The prompt (read from stdin when omitted)
    pub prompt: Option<String>,

    /// Model to generate with
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Use this provider first instead of the best-ranked one
    #[arg(short, long, value_name = "ID")]
    pub provider: Option<String>,

    /// System prompt placed before the user prompt
    #[arg(short, long, value_name = "TEXT")]
    pub system: Option<String>,

    /// Print text as it arrives
    #[arg(long)]
    pub stream: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ExclusionCommand {
    /// Exclude providers from selection
    Add {
        #[arg(required = true, value_name = "ID")]
        ids: Vec<String>,
    },
    /// Allow previously excluded providers again
    Remove {
        #[arg(required = true, value_name = "ID")]
        ids: Vec<String>,
    },
    /// Print the exclusion list
    List,
    /// Remove every exclusion
    Clear,
}
