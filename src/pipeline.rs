//! End-to-end batch validation.
//!
//! Data flows one way: file → records → evaluated records → statistics.
//! Report writing is left to the caller so that a failed write never
//! loses the computed statistics.

use crate::config::ValidatorConfig;
use crate::error::Result;
use crate::loader::{LoadOutcome, load_records, parse_records};
use crate::rules::{EvaluatedRecord, evaluate};
use crate::stats::{RunningStatistics, Summary};
use std::path::Path;
use tracing::{debug, info};

/// Records between progress events.
const PROGRESS_INTERVAL: usize = 100;

/// Everything produced by one batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRun {
    pub evaluated: Vec<EvaluatedRecord>,
    pub stats: RunningStatistics,
    /// Data lines ignored because the record limit was reached.
    pub truncated: usize,
    /// Data lines rejected by the strict numeric policy.
    pub rejected: usize,
}

impl BatchRun {
    /// Rates and averages, or `None` when no records were evaluated.
    pub fn summary(&self) -> Option<Summary> {
        self.stats.finalize()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluated.is_empty()
    }
}

/// Load the file at `path` and run every record through evaluation and
/// aggregation.
///
/// Fails only when the input cannot be opened.
pub fn run_batch(path: impl AsRef<Path>, config: &ValidatorConfig) -> Result<BatchRun> {
    let outcome = load_records(path, &config.loader)?;
    Ok(process(outcome, config))
}

/// Same as [`run_batch`] for input already in memory.
pub fn run_batch_text(text: &str, config: &ValidatorConfig) -> BatchRun {
    process(parse_records(text, &config.loader), config)
}

fn process(outcome: LoadOutcome, config: &ValidatorConfig) -> BatchRun {
    let total = outcome.len();
    let mut evaluated = Vec::with_capacity(total);
    let mut stats = RunningStatistics::new();

    for (i, record) in outcome.records.iter().enumerate() {
        let e = evaluate(record, &config.limits);
        debug!(
            id = %e.record.id,
            power = e.power,
            verdict = e.actual_result(),
            matches = e.matches_expected,
            "evaluated"
        );
        stats.observe(&e);
        evaluated.push(e);

        let done = i + 1;
        if done % PROGRESS_INTERVAL == 0 || done == total {
            debug!("progress: {done}/{total} ({}%)", done * 100 / total);
        }
    }

    info!(
        total = stats.total,
        passed = stats.passed,
        failed = stats.failed,
        "batch evaluated"
    );

    BatchRun {
        evaluated,
        stats,
        truncated: outcome.truncated,
        rejected: outcome.rejected,
    }
}
