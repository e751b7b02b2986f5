//! Command-line arguments for jtlgate.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Output format for the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text report (default)
    Text,
    /// JSON document for machine consumers
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "jtlgate")]
#[command(version)]
#[command(
    about = "Fail a pipeline when JMeter results breach latency, error-rate or throughput thresholds",
    long_about = None
)]
pub struct Cli {
    /// Path to the results file (JMeter JTL in CSV form)
    #[arg(value_name = "RESULTS", required_unless_present = "print_default_config")]
    pub results: Option<PathBuf>,

    /// Threshold policy JSON file; the built-in defaults apply when omitted
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Field delimiter used in the results file
    #[arg(long, value_name = "CHAR", default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Report format written to stdout
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Print the built-in threshold policy as JSON and exit
    #[arg(long)]
    pub print_default_config: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_delimiter(value: &str) -> Result<u8, String> {
    if value == "\\t" || value == "tab" {
        return Ok(b'\t');
    }
    match value.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(format!("delimiter must be a single ASCII character (got: {value:?})")),
    }
}
