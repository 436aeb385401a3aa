//! CLI tool to validate chip measurements against a chip variant.
//!
//! Usage:
//!   multi-validate --specs chip_specs.txt --variant 1 --voltage 1.8 --current 0.8 \
//!       --temperature 25 --frequency 500
//!   multi-validate --specs chip_specs.txt --measurements readings.txt
//!
//! Each measurement line is `voltage|current|temperature|frequency`.

use chip_validate::variant::{self, ChipVariant, Measurement, MultiSummary};
use chip_validate::{ValidationError, ValidatorConfig, logging};
use clap::Parser;
use std::fs;
use std::process;
use tracing::warn;

/// Validate voltage, current, power, temperature, and frequency of chips.
#[derive(Parser)]
#[command(name = "multi-validate", version)]
struct Cli {
    /// Chip specification file with [CHIP_VARIANT_*] sections
    #[arg(short, long)]
    specs: Option<String>,

    /// Validator configuration (TOML) providing [[variants]]
    #[arg(short, long)]
    config: Option<String>,

    /// Index of the chip variant to validate against
    #[arg(long, default_value_t = 0)]
    variant: usize,

    /// List the loaded chip variants and exit
    #[arg(long)]
    list: bool,

    /// File of measurements, one `voltage|current|temperature|frequency` per line
    #[arg(short, long, conflicts_with_all = ["voltage", "current", "temperature", "frequency"])]
    measurements: Option<String>,

    /// Measured voltage (V)
    #[arg(long, required_unless_present_any = ["measurements", "list"])]
    voltage: Option<f64>,

    /// Measured current (A)
    #[arg(long, required_unless_present_any = ["measurements", "list"])]
    current: Option<f64>,

    /// Measured temperature (°C)
    #[arg(long, required_unless_present_any = ["measurements", "list"])]
    temperature: Option<f64>,

    /// Measured frequency (MHz)
    #[arg(long, required_unless_present_any = ["measurements", "list"])]
    frequency: Option<f64>,

    /// Show loaded variants and per-parameter details on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn load_variants(cli: &Cli) -> Vec<ChipVariant> {
    if let Some(path) = &cli.specs {
        let parsed = fs::read_to_string(path)
            .map_err(|e| ValidationError::io(path, e))
            .and_then(|text| variant::parse_chip_specs(&text));
        match parsed {
            Ok(variants) if !variants.is_empty() => return variants,
            Ok(_) => warn!("no chip variants in '{path}'; using default specifications"),
            Err(e) => warn!("could not load chip specifications from '{path}': {e}"),
        }
        return vec![ChipVariant::default()];
    }

    match &cli.config {
        Some(path) => match ValidatorConfig::from_path(path) {
            Ok(config) => config.variants_or_default(),
            Err(e) => {
                eprintln!("Error reading configuration: {e}");
                process::exit(1);
            }
        },
        None => vec![ChipVariant::default()],
    }
}

fn load_measurements(cli: &Cli) -> Vec<Measurement> {
    if let Some(path) = &cli.measurements {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Error reading measurements file '{path}': {e}");
                process::exit(1);
            }
        };
        return match variant::parse_measurements(&text) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Error in measurements file '{path}': {e}");
                process::exit(1);
            }
        };
    }

    // clap guarantees all four flags when no file is given.
    match (cli.voltage, cli.current, cli.temperature, cli.frequency) {
        (Some(voltage), Some(current), Some(temperature), Some(frequency)) => vec![Measurement {
            voltage,
            current,
            temperature,
            frequency,
        }],
        _ => {
            eprintln!("Error: --voltage, --current, --temperature and --frequency are required");
            process::exit(2);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let variants = load_variants(&cli);
    if cli.list || cli.verbose {
        println!("Available chip variants:");
        for (i, v) in variants.iter().enumerate() {
            println!("  {i}. {}", v.name);
            println!(
                "     Voltage: {:.1}V, Max Current: {:.1}A, Max Power: {:.1}W",
                v.nominal_voltage, v.max_current, v.max_power
            );
        }
        println!();
        if cli.list {
            return;
        }
    }

    let chip = match variant::select_variant(&variants, cli.variant) {
        Ok(chip) => chip,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let measurements = load_measurements(&cli);
    if measurements.is_empty() {
        println!("No tests performed.");
        return;
    }

    let results: Vec<_> = measurements
        .iter()
        .map(|m| variant::validate_chip(chip, m))
        .collect();
    for r in &results {
        println!("{}", r.render());
    }

    if let Some(summary) = MultiSummary::from_results(&results) {
        print!("{}", summary.render());
    }
}
