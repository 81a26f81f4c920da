//! ownd - Ownership drift CLI tool
//!
//! Reads managed fields history from YAML/JSON files and reports writes by
//! unexpected managers.

use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use ownership_drift::{
    decode_records, decode_records_lenient, tree_to_paths, Detector, OwnershipTree,
};

const LOG_ENV: &str = "OWND_LOG";

#[derive(Debug, Parser)]
#[command(name = "ownd", version, about = "Ownership drift CLI tool")]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check whether a manager's fields were overwritten by another manager
    Detect {
        /// Name of the original manager
        #[arg(short, long)]
        manager: String,
        /// Managed fields list or resource, as YAML or JSON. Use '-' for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
        /// Fail on undecodable ownership trees instead of skipping them
        #[arg(long)]
        strict: bool,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },
    /// List the field paths of one ownership tree
    Paths {
        /// Ownership tree as YAML or JSON. Use '-' for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
        /// Print match patterns instead of literal paths
        #[arg(long)]
        pattern: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let stdout = io::stdout();
    let mut output = stdout.lock();
    if let Err(e) = run(cli.command, &mut output) {
        eprintln!("Error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Command, output: &mut dyn Write) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Detect {
            manager,
            input,
            strict,
            output: format,
        } => detect(&manager, &input, strict, format, output),
        Command::Paths { input, pattern } => paths(&input, pattern, output),
    }
}

fn read_input(input: &str) -> Result<String, Box<dyn std::error::Error>> {
    if input == "-" {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
        Ok(content)
    } else {
        Ok(fs::read_to_string(input).map_err(|e| format!("Failed to read file {:?}: {}", input, e))?)
    }
}

fn detect(
    manager: &str,
    input: &str,
    strict: bool,
    format: OutputFormat,
    output: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = read_input(input)?;
    let records = if strict {
        decode_records(&content)?
    } else {
        decode_records_lenient(&content)?.records
    };

    let detection = Detector::default().detect(manager, &records);

    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *output, &detection)?;
            writeln!(output)?;
        }
        OutputFormat::Text => {
            writeln!(output, "overwritten: {}", detection.overwritten)?;
            writeln!(output, "other manager: {}", detection.other_manager)?;
            if !detection.conflicts.is_empty() {
                writeln!(output, "\nConflicts:")?;
                for conflict in detection.conflicts.iter() {
                    writeln!(output, "  - {}", conflict)?;
                }
            }
        }
    }

    Ok(())
}

fn paths(input: &str, pattern: bool, output: &mut dyn Write) -> Result<(), Box<dyn std::error::Error>> {
    let content = read_input(input)?;
    let document: serde_json::Value = if content.trim_start().starts_with('{') {
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse JSON: {}", e))?
    } else {
        serde_yaml::from_str(&content).map_err(|e| format!("Failed to parse YAML: {}", e))?
    };

    let tree = match document {
        serde_json::Value::Null => None,
        value => Some(OwnershipTree::from_json_value(&value)?),
    };

    for path in tree_to_paths(tree.as_ref(), pattern)? {
        writeln!(output, "{}", path)?;
    }

    Ok(())
}
