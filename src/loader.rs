//! Record loader for pipe-delimited test case files.
//!
//! Lines are read in file order. Blank lines, `#` comments, and a header
//! line whose first field is `test_id` (any case) are skipped. The record
//! buffer is bounded by [`LoaderConfig::max_records`]; once it is full the
//! rest of the file is counted but not stored.

use crate::error::{Result, ValidationError};
use crate::record::{DELIMITER, NumericPolicy, Record};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Default cap on records held in memory.
pub const DEFAULT_MAX_RECORDS: usize = 10_000;

/// Header token recognised in the first column.
const HEADER_TOKEN: &str = "test_id";

/// Loader settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Records kept before the rest of the file is ignored.
    pub max_records: usize,
    /// Treatment of malformed numeric fields.
    pub numeric_policy: NumericPolicy,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_records: DEFAULT_MAX_RECORDS,
            numeric_policy: NumericPolicy::Lenient,
        }
    }
}

/// Result of a load: the kept records plus what was dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadOutcome {
    pub records: Vec<Record>,
    /// Data lines ignored because `max_records` was reached.
    pub truncated: usize,
    /// Data lines rejected under [`NumericPolicy::Strict`].
    pub rejected: usize,
}

impl LoadOutcome {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated > 0
    }
}

/// Load records from the file at `path`.
///
/// Returns [`ValidationError::FileNotFound`] when the file cannot be
/// opened. A file with no data rows yields an empty outcome, not an error.
/// Invalid UTF-8 sequences are replaced rather than rejected.
pub fn load_records(path: impl AsRef<Path>, config: &LoaderConfig) -> Result<LoadOutcome> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|source| ValidationError::FileNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| ValidationError::io(path, e))?;

    let text = String::from_utf8_lossy(&bytes);
    let outcome = parse_records(&text, config);
    debug!(
        path = %path.display(),
        records = outcome.len(),
        "loaded test cases"
    );
    Ok(outcome)
}

/// Parse records from already-read text.
pub fn parse_records(text: &str, config: &LoaderConfig) -> LoadOutcome {
    let mut outcome = LoadOutcome::default();
    let mut seen_data = false;

    for (index, raw) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.trim_end_matches('\r');

        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !seen_data && is_header(line) {
            debug!(line = line_number, "skipping header");
            continue;
        }
        seen_data = true;

        if outcome.records.len() >= config.max_records {
            outcome.truncated += 1;
            continue;
        }

        match Record::parse_line(line, config.numeric_policy, line_number) {
            Ok(record) => outcome.records.push(record),
            Err(e) => {
                warn!("rejected record: {e}");
                outcome.rejected += 1;
            }
        }
    }

    if outcome.is_truncated() {
        warn!(
            "record limit of {} reached; rest of file ignored ({} lines), {} records processed",
            config.max_records,
            outcome.truncated,
            outcome.len()
        );
    }

    outcome
}

fn is_header(line: &str) -> bool {
    line.split(DELIMITER)
        .next()
        .is_some_and(|first| first.trim().eq_ignore_ascii_case(HEADER_TOKEN))
}
