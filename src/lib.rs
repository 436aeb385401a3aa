//! # chip-validate
//!
//! Batch validation of chip power-rail test cases.
//!
//! Test cases are read from a pipe-delimited file, checked against
//! voltage, current, and power limits, folded into pass/fail statistics,
//! and written out as a per-record CSV and a narrative summary.
//!
//! ## Overview
//!
//! The batch pass runs in one direction, each step consuming the last:
//! - **Loader**: file → [`Record`]s, skipping comments and the header
//! - **Evaluator**: [`Record`] → [`EvaluatedRecord`] (power and three checks)
//! - **Aggregator**: [`EvaluatedRecord`]s → [`RunningStatistics`] → [`Summary`]
//! - **Reporter**: detail CSV and summary text
//!
//! A separate multi-parameter validator checks one chip's voltage,
//! current, power, temperature, and frequency against a [`ChipVariant`].
//! Single-purpose checks live in [`voltage`] (rail tolerance), [`power`]
//! (consumption bands), and [`safety`] (margins from hard limits), with
//! operator input screened by [`input`].
//!
//! ## Example
//!
//! ```
//! use chip_validate::{Limits, Record, RunningStatistics, evaluate};
//!
//! let records = vec![
//!     Record::from_line("TC001|Nominal|1.80|0.50|0.90|PASS|nominal"),
//!     Record::from_line("TC002|Undervoltage|1.60|0.50|0.80|FAIL|voltage"),
//! ];
//!
//! let limits = Limits::default();
//! let evaluated: Vec<_> = records.iter().map(|r| evaluate(r, &limits)).collect();
//! let summary = RunningStatistics::fold(&evaluated).finalize().unwrap();
//!
//! assert_eq!(summary.passed, 1);
//! assert_eq!(summary.accuracy_rate, 100.0);
//! ```

pub mod config;
pub mod error;
pub mod input;
pub mod loader;
pub mod logging;
pub mod pipeline;
pub mod power;
pub mod record;
pub mod report;
pub mod rules;
pub mod safety;
pub mod stats;
pub mod variant;
pub mod voltage;

pub use config::ValidatorConfig;
pub use error::ValidationError;
pub use input::{FieldError, InputError};
pub use loader::{DEFAULT_MAX_RECORDS, LoadOutcome, LoaderConfig, load_records, parse_records};
pub use pipeline::{BatchRun, run_batch, run_batch_text};
pub use record::{NumericPolicy, Record};
pub use report::{
    QualityGrade, ReportOutcome, ReportPaths, render_summary, write_detail_csv, write_reports,
};
pub use rules::{EvaluatedRecord, Limits, Range, evaluate, evaluate_all};
pub use stats::{ExactSum, QuantityStats, QuantitySummary, RunningStatistics, Summary};
pub use variant::{
    ChipVariant, Measurement, MultiSummary, MultiValidation, ParameterResult, parse_chip_specs,
    validate_chip,
};
