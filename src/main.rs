//! Trackmail CLI entry point.
//!
//! Thin stand-in for the ingestion boundary: reads an email as JSON, runs the
//! parsing core, and prints the structured answer. Persistence and transport
//! belong to the surrounding services, not here.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use trackmail::config::TrackmailConfig;
use trackmail::email::EmailMessage;
use trackmail::engine::ParseEngine;
use trackmail::logging;
use trackmail::rules::RuleTable;
use trackmail::semantic::{HttpSemanticExtractor, SemanticExtractor};

/// Trackmail: email parsing core for a job-application tracker.
#[derive(Parser)]
#[command(name = "trackmail", version, about)]
struct Cli {
    /// Write JSON logs to this directory (daily rotation) in addition to stderr.
    #[arg(long, global = true)]
    logs_dir: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Parse one email (JSON on stdin or from a file) and print the answer.
    Parse {
        /// Path to an email JSON file; stdin when omitted.
        #[arg(long)]
        input: Option<PathBuf>,
        /// Enable the semantic (AI) layer regardless of config.
        #[arg(long)]
        semantic: bool,
        /// Pretty-print the output JSON.
        #[arg(long)]
        pretty: bool,
    },
    /// Print the builtin rule-table version and rule counts.
    Rules,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = TrackmailConfig::load().context("failed to load configuration")?;
    let _guard = match &cli.logs_dir {
        Some(dir) => Some(logging::init_production(dir, &config.log_level.0)?),
        None => {
            logging::init_cli(&config.log_level.0);
            None
        }
    };

    match cli.command {
        Command::Parse {
            input,
            semantic,
            pretty,
        } => handle_parse(config, input, semantic, pretty).await,
        Command::Rules => handle_rules(),
    }
}

async fn handle_parse(
    mut config: TrackmailConfig,
    input: Option<PathBuf>,
    semantic: bool,
    pretty: bool,
) -> anyhow::Result<()> {
    if semantic {
        config.semantic.enabled = true;
    }

    let raw = match input {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };
    let email: EmailMessage =
        serde_json::from_str(&raw).context("input is not a valid email JSON object")?;

    let adapter: Option<Arc<dyn SemanticExtractor>> = config.semantic.enabled.then(|| {
        let extractor = HttpSemanticExtractor::new(
            config.semantic.base_url.clone(),
            config.semantic.model.clone(),
            config.semantic.api_key.clone(),
            Duration::from_secs(config.semantic.timeout_secs),
        );
        Arc::new(extractor) as Arc<dyn SemanticExtractor>
    });

    let engine = ParseEngine::new(&config, adapter);
    let parse = engine.process(&email).await;

    let output = if pretty {
        serde_json::to_string_pretty(&parse)
    } else {
        serde_json::to_string(&parse)
    }
    .context("failed to serialize parse result")?;
    println!("{output}");
    Ok(())
}

fn handle_rules() -> anyhow::Result<()> {
    let table = RuleTable::builtin();
    println!("rules version: {}", table.version);
    println!("subject rules: {}", table.subject_rules.len());
    println!("structural rules: {}", table.structural_rules.len());
    println!("lexical rules: {}", table.lexical_rules.len());
    println!("basic rules: {}", table.basic_rules.len());
    let indicator_count: usize = table.indicators.iter().map(|s| s.indicators.len()).sum();
    println!(
        "status indicator sets: {} ({} phrases)",
        table.indicators.len(),
        indicator_count
    );
    Ok(())
}
