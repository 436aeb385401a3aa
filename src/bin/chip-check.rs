//! Quick single-purpose checks of chip readings.
//!
//! Usage:
//!   chip-check voltage 1.80 1.75 2.10
//!   chip-check voltage --nominal 3.3 --tolerance 10 3.1 3.4
//!   chip-check power 1.8,0.5 2.0,1.2
//!   chip-check safety 1.8,0.5,25 1.55,0.5,84.95
//!
//! Invalid readings are reported on stderr and skipped.

use chip_validate::input::{self, FIELD_SEPARATOR};
use chip_validate::power::{self, PowerLimits, PowerReading, PowerSummary};
use chip_validate::safety::{self, MAX_READINGS, SafetyLimits, SafetyReading, SafetySummary};
use chip_validate::variant::tolerance_window;
use chip_validate::voltage::{self, NOMINAL_VOLTAGE, TOLERANCE_PERCENT, VoltageSummary};
use chip_validate::{Range, logging};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};

#[derive(Parser, Debug)]
#[command(name = "chip-check", version, about = "Check voltage, power, or safety margins of chip readings")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log skipped readings and limits on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check rail voltages against nominal ± tolerance
    Voltage(VoltageArgs),
    /// Compute and classify power from `voltage,current` pairs
    Power(ReadingArgs),
    /// Analyse safety margins of `voltage,current,temperature` triples
    Safety(ReadingArgs),
}

#[derive(Args, Debug)]
struct VoltageArgs {
    /// Nominal rail voltage (V)
    #[arg(long, default_value_t = NOMINAL_VOLTAGE)]
    nominal: f64,

    /// Allowed deviation from nominal (%)
    #[arg(long, default_value_t = TOLERANCE_PERCENT)]
    tolerance: f64,

    /// Measured voltages (V)
    #[arg(allow_hyphen_values = true)]
    readings: Vec<String>,
}

#[derive(Args, Debug)]
struct ReadingArgs {
    /// Readings, fields separated by commas
    #[arg(allow_hyphen_values = true)]
    readings: Vec<String>,
}

/// Keep at most [`MAX_READINGS`] inputs.
fn capped(readings: &[String]) -> &[String] {
    if readings.len() > MAX_READINGS {
        warn!(
            "{} readings given; only the first {MAX_READINGS} are checked",
            readings.len()
        );
        &readings[..MAX_READINGS]
    } else {
        readings
    }
}

fn check_voltages(args: &VoltageArgs) {
    let window = tolerance_window(args.nominal, args.tolerance);
    println!(
        "Acceptable range: {:.2}V to {:.2}V ({:.1}V ± {:.1}%)\n",
        window.min, window.max, args.nominal, args.tolerance
    );

    let any = Range::new(f64::MIN, f64::MAX);
    let mut checks = Vec::new();
    for (i, text) in capped(&args.readings).iter().enumerate() {
        match input::validate_float(text, any) {
            Ok(v) => {
                let check = voltage::check_voltage(v, window);
                println!("Test {}: {}", i + 1, check.render());
                checks.push(check);
            }
            Err(e) => eprintln!("Error: reading {} ('{text}'): {e}", i + 1),
        }
    }

    println!();
    match VoltageSummary::from_checks(&checks) {
        Some(summary) => print!("{}", summary.render()),
        None => println!("No voltage readings processed."),
    }
}

fn check_power(args: &ReadingArgs) {
    let limits = PowerLimits::default();
    debug!(?limits, "power limits");

    let mut readings = Vec::new();
    for (i, text) in capped(&args.readings).iter().enumerate() {
        match PowerReading::parse(text, &limits) {
            Ok(reading) => {
                println!("Calculation {}:\n{}", i + 1, reading.render(&limits));
                readings.push(reading);
            }
            Err(e) => {
                eprintln!("Error: reading {} ('{text}'): {e}", i + 1);
                report_envelope(text, &limits);
            }
        }
    }

    match PowerSummary::from_readings(&readings, &limits) {
        Some(summary) => print!("{}", summary.render()),
        None => println!("No power readings processed."),
    }
}

/// Say how far each numeric field of a refused reading lies outside the envelope.
fn report_envelope(text: &str, limits: &PowerLimits) {
    let fields = [
        ("Voltage", "V", limits.voltage),
        ("Current", "A", limits.current),
    ];
    for (part, (quantity, unit, range)) in text.split(FIELD_SEPARATOR).zip(fields) {
        let Ok(value) = part.trim().parse::<f64>() else {
            continue;
        };
        if let Some(message) = power::describe_out_of_range(quantity, unit, value, range) {
            eprintln!("  → {message}");
        }
    }
}

fn check_safety(args: &ReadingArgs) {
    let limits = SafetyLimits::default();
    debug!(?limits, margin = safety::SAFETY_MARGIN, "safety limits");

    let mut analyses = Vec::new();
    for (i, text) in capped(&args.readings).iter().enumerate() {
        match SafetyReading::parse(text, &limits) {
            Ok(reading) => {
                let analysis = safety::analyze(reading, &limits);
                println!("Reading {}:\n{}", i + 1, analysis.render());
                analyses.push(analysis);
            }
            Err(e) => eprintln!("Error: reading {} ('{text}'): {e}", i + 1),
        }
    }

    match SafetySummary::from_analyses(&analyses) {
        Some(summary) => print!("{}", summary.render()),
        None => println!("No safety readings processed."),
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match &cli.command {
        Command::Voltage(args) => check_voltages(args),
        Command::Power(args) => check_power(args),
        Command::Safety(args) => check_safety(args),
    }
}
