use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use atomgen::schema;

#[derive(Parser, Debug)]
#[command(name = "atomgen", about = "Atom 1.0 feed builder and schema checker")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate an Atom document against the RFC 4287 schema
    Check {
        /// Atom document to validate
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    match args.command {
        Command::Check { file, json } => check(&file, json),
    }
}

fn check(file: &Path, json: bool) -> Result<ExitCode> {
    let metadata = std::fs::metadata(file)
        .with_context(|| format!("Failed to read metadata for {}", file.display()))?;
    if !metadata.is_file() {
        anyhow::bail!("{} is not a regular file", file.display());
    }

    let document = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let report = schema::validate(&document);

    if json {
        let rendered =
            serde_json::to_string_pretty(&report).context("Failed to encode report as JSON")?;
        println!("{rendered}");
    } else if report.is_valid() {
        println!("{}: valid", file.display());
    } else {
        for diagnostic in report.diagnostics() {
            println!("{}:{diagnostic}", file.display());
        }
    }

    if report.is_valid() {
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::warn!(
            path = %file.display(),
            diagnostics = report.diagnostics().len(),
            "Document does not conform to the Atom schema"
        );
        Ok(ExitCode::FAILURE)
    }
}
