mod cli;

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use jtlgate_core::records::{parse_results_file, ParseOptions};
use jtlgate_core::results::export::{export_json, render_text};
use jtlgate_core::results::run_gate;
use jtlgate_core::thresholds::io::{policy_to_json, read_policy};
use jtlgate_core::thresholds::model::ThresholdPolicy;
use jtlgate_core::thresholds::validation::validate_policy;
use jtlgate_core::GateError;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, OutputFormat};

/// Exit status for usage, input and configuration errors.
const EXIT_ERROR: u8 = 2;

/// Initialize the stderr log subscriber. `RUST_LOG` refines the default level.
fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_policy(config: Option<&Path>) -> Result<ThresholdPolicy, GateError> {
    match config {
        Some(path) => read_policy(path),
        None => {
            tracing::debug!("no --config given; using built-in thresholds");
            Ok(ThresholdPolicy::builtin())
        }
    }
}

/// Run one gate check, writing the report to `out`. Returns the exit status.
fn run(cli: &Cli, out: &mut impl Write) -> u8 {
    if cli.print_default_config {
        return match policy_to_json(&ThresholdPolicy::builtin()) {
            Ok(json) => emit(out, &format!("{json}\n"), 0),
            Err(e) => {
                eprintln!("ERROR: {e}");
                EXIT_ERROR
            }
        };
    }

    let Some(results_path) = cli.results.as_deref() else {
        eprintln!("Usage: jtlgate <results.jtl> [--config thresholds.json]");
        return EXIT_ERROR;
    };

    let policy = match load_policy(cli.config.as_deref()) {
        Ok(policy) => policy,
        Err(e) => {
            eprintln!("ERROR: Failed to load threshold config: {e}");
            return EXIT_ERROR;
        }
    };
    let problems = validate_policy(&policy);
    if !problems.is_empty() {
        for problem in &problems {
            eprintln!("ERROR: Invalid threshold config: {problem}");
        }
        return EXIT_ERROR;
    }

    let options = ParseOptions {
        delimiter: cli.delimiter,
    };
    let records = match parse_results_file(results_path, options) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("ERROR: Failed to parse results file: {e}");
            return EXIT_ERROR;
        }
    };
    if records.is_empty() {
        eprintln!("WARNING: No results found in results file");
        return EXIT_ERROR;
    }

    let report = match run_gate(&records, &policy) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return EXIT_ERROR;
        }
    };

    let rendered = match cli.format {
        OutputFormat::Text => render_text(&report),
        OutputFormat::Json => match export_json(&report) {
            Ok(json) => format!("{json}\n"),
            Err(e) => {
                eprintln!("ERROR: Failed to render report: {e}");
                return EXIT_ERROR;
            }
        },
    };

    emit(out, &rendered, report.outcome().exit_code())
}

/// Write `text` to `out`, returning `code` or the error status if the write fails.
fn emit(out: &mut impl Write, text: &str, code: u8) -> u8 {
    match out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
        Ok(()) => code,
        Err(e) => {
            eprintln!("ERROR: stdout write error: {e}");
            EXIT_ERROR
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    ExitCode::from(run(&cli, &mut out))
}
