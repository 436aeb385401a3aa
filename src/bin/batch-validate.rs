//! CLI tool to validate a batch of chip test cases.
//!
//! Usage:
//!   batch-validate -i <cases.txt> -o <prefix> [-v]
//!
//! Writes `<prefix>.csv` (one row per test case) and
//! `<prefix>_summary.txt`, and prints the summary to stdout.

use chip_validate::report::{self, ReportPaths};
use chip_validate::{NumericPolicy, ValidatorConfig, logging, run_batch};
use clap::Parser;
use std::process;
use tracing::warn;

/// Validate chip test cases from a pipe-delimited file.
#[derive(Parser)]
#[command(name = "batch-validate", version)]
struct Cli {
    /// Input test case file (id|description|voltage|current|expected_power|expected_result|category)
    #[arg(short, long, default_value = "config/test_cases.txt")]
    input: String,

    /// Output file prefix for <prefix>.csv and <prefix>_summary.txt
    #[arg(short, long, default_value = "batch_results")]
    output: String,

    /// Validator configuration (TOML)
    #[arg(short, long)]
    config: Option<String>,

    /// Maximum number of records to process; the rest of the file is ignored
    #[arg(long)]
    max_records: Option<usize>,

    /// Reject records with malformed numeric fields instead of reading them as 0.0
    #[arg(long)]
    strict: bool,

    /// Show configuration, per-record verdicts, and progress on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => match ValidatorConfig::from_path(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error reading configuration: {e}");
                process::exit(1);
            }
        },
        None => ValidatorConfig::default(),
    };
    if let Some(max) = cli.max_records {
        config.loader.max_records = max;
    }
    if cli.strict {
        config.loader.numeric_policy = NumericPolicy::Strict;
    }

    if cli.verbose {
        eprintln!("Input:       {}", cli.input);
        eprintln!("Output:      {}", cli.output);
        eprintln!("Max records: {}", config.loader.max_records);
        eprintln!("Numeric:     {:?}", config.loader.numeric_policy);
    }

    let run = match run_batch(&cli.input, &config) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("Error: failed to load test cases: {e}");
            process::exit(1);
        }
    };

    if run.truncated > 0 {
        eprintln!(
            "Note: record limit reached; {} further lines ignored, {} records processed",
            run.truncated,
            run.evaluated.len()
        );
    }
    if run.rejected > 0 {
        eprintln!("Note: {} malformed records rejected", run.rejected);
    }

    let summary = run.summary();
    print!("{}", report::render_console_summary(summary.as_ref()));

    let paths = ReportPaths::from_prefix(&cli.output);
    let generated_at = chrono::Local::now().naive_local();
    let outcome = report::write_reports(&paths, &run.evaluated, summary.as_ref(), generated_at);
    match &outcome.detail {
        Ok(path) => println!("\nDetailed results: {}", path.display()),
        Err(e) => {
            warn!("detail report not written: {e}");
            eprintln!("Warning: CSV export failed: {e}");
        }
    }
    match &outcome.summary {
        Ok(path) => println!("Summary report:   {}", path.display()),
        Err(e) => {
            warn!("summary report not written: {e}");
            eprintln!("Warning: summary report generation failed: {e}");
        }
    }

    if let Some(summary) = &summary {
        println!();
        print!("{}", report::render_assessment(summary));
    }
}
