//! Report rendering: the per-record detail CSV and the narrative summary.
//!
//! Output artifacts for a prefix `P`:
//! - `P.csv`: one row per evaluated record
//! - `P_summary.txt`: execution summary, statistics, and quality grades
//!
//! A failed write is returned to the caller and never aborts the run.

use crate::error::{Result, ValidationError};
use crate::rules::EvaluatedRecord;
use crate::stats::Summary;
use chrono::NaiveDateTime;
use csv::QuoteStyle;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Column names of the detail CSV, in order.
pub const DETAIL_HEADER: [&str; 15] = [
    "TestID",
    "Description",
    "Voltage",
    "Current",
    "ExpectedPower",
    "CalculatedPower",
    "VoltagePass",
    "CurrentPass",
    "PowerPass",
    "OverallPass",
    "ExpectedResult",
    "ActualResult",
    "MatchesExpected",
    "Category",
    "Notes",
];

/// Body of the summary report when nothing was evaluated.
pub const NO_TESTS: &str = "No tests performed.";

/// Section headers of the summary report, in order.
const SECTIONS: [&str; 4] = [
    "TEST EXECUTION SUMMARY",
    "STATISTICAL ANALYSIS",
    "QUALITY ASSESSMENT",
    "PREDICTION ACCURACY",
];

/// Timestamp format of the summary report, as produced by C `ctime`.
const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Quality band for a percentage rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum QualityGrade {
    Poor,
    Acceptable,
    Good,
    Excellent,
}

impl QualityGrade {
    /// ≥95 excellent, ≥90 good, ≥80 acceptable, otherwise poor.
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 95.0 {
            QualityGrade::Excellent
        } else if rate >= 90.0 {
            QualityGrade::Good
        } else if rate >= 80.0 {
            QualityGrade::Acceptable
        } else {
            QualityGrade::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityGrade::Excellent => "EXCELLENT",
            QualityGrade::Good => "GOOD",
            QualityGrade::Acceptable => "ACCEPTABLE",
            QualityGrade::Poor => "POOR",
        }
    }

    /// Process recommendation for a pass-rate grade.
    pub fn recommendation(&self) -> &'static str {
        match self {
            QualityGrade::Excellent => "Continue current manufacturing process",
            QualityGrade::Good => "Monitor process parameters",
            QualityGrade::Acceptable => "Review and optimize process",
            QualityGrade::Poor => "IMMEDIATE PROCESS REVIEW REQUIRED",
        }
    }

    /// Guidance for an accuracy-rate grade.
    pub fn calibration_advice(&self) -> &'static str {
        match self {
            QualityGrade::Excellent => "Test criteria are well-calibrated",
            QualityGrade::Good => "Minor test criteria adjustments may be beneficial",
            QualityGrade::Acceptable => "Test criteria should be reviewed",
            QualityGrade::Poor => "Test criteria require review and recalibration",
        }
    }

    fn marker(&self) -> &'static str {
        match self {
            QualityGrade::Excellent | QualityGrade::Good => "✓",
            QualityGrade::Acceptable => "⚠",
            QualityGrade::Poor => "✗",
        }
    }
}

fn pass_fail(pass: bool) -> &'static str {
    if pass { "PASS" } else { "FAIL" }
}

fn yes_no(yes: bool) -> &'static str {
    if yes { "YES" } else { "NO" }
}

/// Fields of one detail row, in [`DETAIL_HEADER`] order.
pub fn detail_fields(e: &EvaluatedRecord) -> [String; 15] {
    let r = &e.record;
    [
        r.id.clone(),
        r.description.clone(),
        format!("{:.3}", r.voltage),
        format!("{:.3}", r.current),
        format!("{:.3}", r.expected_power),
        format!("{:.3}", e.power),
        pass_fail(e.voltage_pass).to_string(),
        pass_fail(e.current_pass).to_string(),
        pass_fail(e.power_pass).to_string(),
        pass_fail(e.overall_pass).to_string(),
        r.expected_result.clone(),
        e.actual_result().to_string(),
        yes_no(e.matches_expected).to_string(),
        r.category.clone(),
        e.notes(),
    ]
}

/// Write the detail table: header row, then one row per record.
///
/// Text fields are quoted and numbers are left bare, so `Notes` is always
/// quoted and embedded quotes are doubled.
pub fn write_detail_csv<W: io::Write>(writer: W, evaluated: &[EvaluatedRecord]) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(QuoteStyle::NonNumeric)
        .from_writer(writer);
    wtr.write_record(DETAIL_HEADER)?;
    for e in evaluated {
        wtr.write_record(detail_fields(e))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render the narrative summary report.
pub fn render_summary(summary: Option<&Summary>, generated_at: NaiveDateTime) -> String {
    let mut out = String::new();
    out.push_str("=== BATCH PROCESSING SUMMARY REPORT ===\n");
    let _ = writeln!(out, "Generated: {}", generated_at.format(TIMESTAMP_FORMAT));
    out.push_str("========================================\n\n");

    let Some(s) = summary else {
        for (i, section) in SECTIONS.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let _ = writeln!(out, "{section}:\n{NO_TESTS}");
        }
        out.push_str("\n=== END OF REPORT ===\n");
        return out;
    };

    let _ = writeln!(out, "{}:", SECTIONS[0]);
    let _ = writeln!(out, "Total test cases processed: {}", s.total);
    let _ = writeln!(out, "Passed: {} ({:.1}%)", s.passed, s.pass_rate);
    let _ = writeln!(out, "Failed: {} ({:.1}%)", s.failed, s.fail_rate());
    let _ = writeln!(
        out,
        "Expected result accuracy: {}/{} ({:.1}%)",
        s.matched, s.total, s.accuracy_rate
    );

    let _ = writeln!(out, "\n{}:", SECTIONS[1]);
    out.push_str(&render_statistics(s));

    let quality = QualityGrade::from_rate(s.pass_rate);
    let _ = writeln!(out, "\n{}:", SECTIONS[2]);
    let _ = writeln!(out, "Overall Quality: {}", quality.label());
    let _ = writeln!(out, "Recommendation: {}", quality.recommendation());

    let accuracy = QualityGrade::from_rate(s.accuracy_rate);
    let _ = writeln!(out, "\n{}:", SECTIONS[3]);
    let _ = writeln!(out, "Test Correlation: {}", accuracy.label());
    let _ = writeln!(out, "{}", accuracy.calibration_advice());

    out.push_str("\n=== END OF REPORT ===\n");
    out
}

fn render_statistics(s: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Average voltage: {:.3}V", s.voltage.average);
    let _ = writeln!(out, "Average current: {:.3}A", s.current.average);
    let _ = writeln!(out, "Average power: {:.3}W", s.power.average);
    let _ = writeln!(out, "Voltage range: {:.3}V - {:.3}V", s.voltage.min, s.voltage.max);
    let _ = writeln!(out, "Current range: {:.3}A - {:.3}A", s.current.min, s.current.max);
    let _ = writeln!(out, "Power range: {:.3}W - {:.3}W", s.power.min, s.power.max);
    out
}

/// Console block printed after a run.
pub fn render_console_summary(summary: Option<&Summary>) -> String {
    let mut out = String::from("=== Batch Processing Summary ===\n");
    let Some(s) = summary else {
        let _ = writeln!(out, "{NO_TESTS}");
        return out;
    };
    let _ = writeln!(out, "Total test cases: {}", s.total);
    let _ = writeln!(out, "Passed: {} ({:.1}%)", s.passed, s.pass_rate);
    let _ = writeln!(out, "Failed: {} ({:.1}%)", s.failed, s.fail_rate());
    let _ = writeln!(out, "Expected result accuracy: {:.1}%", s.accuracy_rate);
    out.push_str(&render_statistics(s));
    out
}

/// Final assessment lines for both grades.
pub fn render_assessment(summary: &Summary) -> String {
    let quality = QualityGrade::from_rate(summary.pass_rate);
    let accuracy = QualityGrade::from_rate(summary.accuracy_rate);
    format!(
        "=== Final Assessment ===\n{} {}: Batch validation shows {} quality\n{} PREDICTION ACCURACY: {} correlation with expected results\n",
        quality.marker(),
        quality.label(),
        quality.label().to_lowercase(),
        accuracy.marker(),
        accuracy.label(),
    )
}

/// Paths of the two report artifacts for an output prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub detail: PathBuf,
    pub summary: PathBuf,
}

impl ReportPaths {
    pub fn from_prefix(prefix: &str) -> Self {
        Self {
            detail: PathBuf::from(format!("{prefix}.csv")),
            summary: PathBuf::from(format!("{prefix}_summary.txt")),
        }
    }
}

/// Outcome of writing each artifact independently.
#[derive(Debug)]
pub struct ReportOutcome {
    pub detail: Result<PathBuf>,
    pub summary: Result<PathBuf>,
}

impl ReportOutcome {
    pub fn all_written(&self) -> bool {
        self.detail.is_ok() && self.summary.is_ok()
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| ValidationError::io(parent, e))?;
    }
    Ok(())
}

fn write_detail_file(path: &Path, evaluated: &[EvaluatedRecord]) -> Result<PathBuf> {
    ensure_parent(path)?;
    let file = fs::File::create(path).map_err(|e| ValidationError::io(path, e))?;
    write_detail_csv(io::BufWriter::new(file), evaluated).map_err(|source| {
        ValidationError::Csv {
            path: path.to_path_buf(),
            source,
        }
    })?;
    info!(path = %path.display(), rows = evaluated.len(), "detail report written");
    Ok(path.to_path_buf())
}

fn write_summary_file(path: &Path, text: &str) -> Result<PathBuf> {
    ensure_parent(path)?;
    fs::write(path, text).map_err(|e| ValidationError::io(path, e))?;
    info!(path = %path.display(), "summary report written");
    Ok(path.to_path_buf())
}

/// Write both artifacts for `paths`. Each write succeeds or fails on its own.
pub fn write_reports(
    paths: &ReportPaths,
    evaluated: &[EvaluatedRecord],
    summary: Option<&Summary>,
    generated_at: NaiveDateTime,
) -> ReportOutcome {
    ReportOutcome {
        detail: write_detail_file(&paths.detail, evaluated),
        summary: write_summary_file(&paths.summary, &render_summary(summary, generated_at)),
    }
}
