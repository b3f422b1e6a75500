use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use fairvalue_core::valuation::ValuationEngine;
use serde_json::Value;

/// Produces an auditable fair-value estimate for a private company from a
/// JSON request file.
#[derive(Parser, Debug)]
#[command(name = "fairvalue", version, about = "Auditable valuation engine CLI")]
struct Cli {
    /// Path to the JSON request payload.
    #[arg(long)]
    request_file: PathBuf,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

fn run(cli: &Cli) -> anyhow::Result<String> {
    let raw = fs::read_to_string(&cli.request_file)
        .with_context(|| format!("Request file not found: {}", cli.request_file.display()))?;
    let payload: Value =
        serde_json::from_str(&raw).context("Request file is not valid JSON")?;

    let engine = ValuationEngine::new();
    let envelope = engine.value_payload(&payload)?;

    let output = if cli.pretty {
        serde_json::to_string_pretty(&envelope)?
    } else {
        serde_json::to_string(&envelope)?
    };
    Ok(output)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            // Errors go to stdout as JSON too, so scripted callers always
            // parse one shape; the exit code signals the failure.
            println!("{}", serde_json::json!({ "error": err.to_string() }));
            ExitCode::FAILURE
        }
    }
}
