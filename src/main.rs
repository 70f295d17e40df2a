//! Binary entry point for waymark.
//!
//! Every subcommand goes through the same tool envelope the library exposes
//! and prints it as JSON on stdout. Logs go to stderr.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr/print_stdout in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use waymark::config::WaymarkConfig;
use waymark::observability::{self, LogFormat};
use waymark::{AnchorDetector, ConversationStore, FilesystemStore, ToolRegistry, ToolResponse};

/// Waymark - marker-annotated conversation memory.
#[derive(Parser)]
#[command(name = "waymark")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, global = true, env = "WAYMARK_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the entry files (overrides config).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log format: pretty or json (overrides config).
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Print compact single-line JSON.
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Save a checkpoint.
    Capture {
        /// Annotated text; read from stdin when omitted.
        text: Option<String>,

        /// Tags for the entry (comma-separated).
        #[arg(short, long)]
        tags: Option<String>,

        /// Skip anchor detection.
        #[arg(long)]
        no_anchors: bool,

        /// Skip summary generation.
        #[arg(long)]
        no_summary: bool,
    },

    /// Search stored entries.
    Search {
        /// Free-text query.
        query: Option<String>,

        /// Filter by context value (repeatable).
        #[arg(long = "context")]
        contexts: Vec<String>,

        /// Filter by cognitive state (repeatable).
        #[arg(long = "state")]
        states: Vec<String>,

        /// Filter by anchor type (repeatable).
        #[arg(long = "anchor-type")]
        anchor_types: Vec<String>,

        /// Word budget.
        #[arg(short, long)]
        max_tokens: Option<usize>,

        /// Return anchors without entry bodies.
        #[arg(long)]
        anchors_only: bool,
    },

    /// List semantic anchors.
    Anchors {
        /// Anchor type: decision, question, blocker or breakthrough.
        #[arg(short = 't', long = "type")]
        anchor_type: Option<String>,

        /// Only unanswered questions.
        #[arg(long)]
        unresolved: bool,

        /// Maximum anchors returned.
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Parse markers without storing anything.
    Parse {
        /// Annotated text; read from stdin when omitted.
        text: Option<String>,
    },

    /// Show store statistics.
    Stats,
}

/// Main entry point.
fn main() -> ExitCode {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli, &config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Loads configuration and applies command-line overrides.
fn load_config(cli: &Cli) -> anyhow::Result<WaymarkConfig> {
    let mut config = WaymarkConfig::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir.clone());
    }
    if let Some(format) = cli.log_format {
        config = config.with_log_format(format);
    }
    Ok(config)
}

/// Runs the selected command. Returns whether the tool call succeeded.
fn run_command(cli: Cli, config: &WaymarkConfig) -> anyhow::Result<bool> {
    let store = Arc::new(
        FilesystemStore::open(config.data_dir.clone())
            .with_context(|| format!("opening store at {}", config.data_dir.display()))?,
    );
    let registry = ToolRegistry::new(store.clone())
        .with_detector(AnchorDetector::new(config.anchors.clone()))
        .with_default_max_tokens(config.default_max_tokens);

    let (tool, arguments) = match cli.command {
        Commands::Capture {
            text,
            tags,
            no_anchors,
            no_summary,
        } => (
            "save_checkpoint",
            json!({
                "content": text_or_stdin(text)?,
                "tags": parse_tags(tags.as_deref()),
                "extract_anchors": !no_anchors,
                "generate_summary": !no_summary,
            }),
        ),

        Commands::Search {
            query,
            contexts,
            states,
            anchor_types,
            max_tokens,
            anchors_only,
        } => (
            "load_context",
            search_arguments(query, contexts, states, anchor_types, max_tokens, anchors_only),
        ),

        Commands::Anchors {
            anchor_type,
            unresolved,
            limit,
        } => {
            let mut args = serde_json::Map::new();
            if let Some(anchor_type) = anchor_type {
                args.insert("type".to_string(), Value::from(anchor_type));
            }
            if unresolved {
                args.insert("unresolved".to_string(), Value::Bool(true));
            }
            if let Some(limit) = limit {
                args.insert("limit".to_string(), Value::from(limit));
            }
            ("get_anchors", Value::Object(args))
        },

        Commands::Parse { text } => ("parse_markers", json!({ "text": text_or_stdin(text)? })),

        Commands::Stats => {
            let response = ToolResponse::from_result(store.count().map(|entries| {
                json!({
                    "entries": entries,
                    "data_dir": config.data_dir.display().to_string(),
                })
            }));
            return print_response(&response, cli.compact);
        },
    };

    let response = registry.execute(tool, arguments);
    print_response(&response, cli.compact)
}

fn search_arguments(
    query: Option<String>,
    contexts: Vec<String>,
    states: Vec<String>,
    anchor_types: Vec<String>,
    max_tokens: Option<usize>,
    anchors_only: bool,
) -> Value {
    let mut args = serde_json::Map::new();
    if let Some(query) = query {
        args.insert("query".to_string(), Value::from(query));
    }
    if !contexts.is_empty() {
        args.insert("contexts".to_string(), Value::from(contexts));
    }
    if !states.is_empty() {
        args.insert("states".to_string(), Value::from(states));
    }
    if !anchor_types.is_empty() {
        args.insert("anchor_types".to_string(), Value::from(anchor_types));
    }
    if let Some(max_tokens) = max_tokens {
        args.insert("max_tokens".to_string(), Value::from(max_tokens));
    }
    if anchors_only {
        args.insert("anchors_only".to_string(), Value::Bool(true));
    }
    Value::Object(args)
}

fn print_response(response: &ToolResponse<Value>, compact: bool) -> anyhow::Result<bool> {
    let rendered = if compact {
        serde_json::to_string(response)?
    } else {
        serde_json::to_string_pretty(response)?
    };
    println!("{rendered}");
    Ok(response.success)
}

/// Uses the argument when given, otherwise reads all of stdin.
fn text_or_stdin(text: Option<String>) -> anyhow::Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("reading text from stdin")?;
    Ok(buffer)
}

/// Splits a comma-separated tag list, dropping blanks.
fn parse_tags(tags: Option<&str>) -> Vec<String> {
    tags.map(|t| {
        t.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect()
    })
    .unwrap_or_default()
}
