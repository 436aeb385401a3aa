//! Single-rail voltage checks and the run-level chip verdict.

use crate::rules::{Deviation, Range};
use crate::variant::tolerance_window;
use std::fmt::Write as _;

/// Nominal rail voltage.
pub const NOMINAL_VOLTAGE: f64 = 1.8;
/// Allowed deviation from nominal, in percent.
pub const TOLERANCE_PERCENT: f64 = 5.0;

/// Result of checking one reading against a rail window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoltageCheck {
    pub voltage: f64,
    /// `None` when the reading is inside the window.
    pub deviation: Option<Deviation>,
}

impl VoltageCheck {
    pub fn passed(&self) -> bool {
        self.deviation.is_none()
    }

    pub fn render(&self) -> String {
        match &self.deviation {
            None => format!(
                "✓ PASS: Voltage {:.2}V is within acceptable range",
                self.voltage
            ),
            Some(d) => format!(
                "✗ FAIL: Voltage {:.2}V is outside acceptable range\n  → {}",
                self.voltage,
                d.describe("Voltage", "V")
            ),
        }
    }
}

pub fn check_voltage(voltage: f64, window: Range) -> VoltageCheck {
    VoltageCheck {
        voltage,
        deviation: window.deviation(voltage),
    }
}

/// Default rail: 1.8 V ± 5%.
pub fn default_window() -> Range {
    tolerance_window(NOMINAL_VOLTAGE, TOLERANCE_PERCENT)
}

/// Verdict on a chip from the share of passing readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipStatus {
    Validated,
    Marginal,
    Failed,
}

impl ChipStatus {
    /// ≥95 validated, ≥90 marginal, otherwise failed.
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 95.0 {
            ChipStatus::Validated
        } else if rate >= 90.0 {
            ChipStatus::Marginal
        } else {
            ChipStatus::Failed
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ChipStatus::Validated => "✓ CHIP VALIDATED - Excellent quality",
            ChipStatus::Marginal => "⚠ CHIP MARGINAL - Review required",
            ChipStatus::Failed => "✗ CHIP FAILED - Reject chip",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoltageSummary {
    pub total: usize,
    pub passed: usize,
    pub pass_rate: f64,
}

impl VoltageSummary {
    /// `None` when no readings were checked.
    pub fn from_checks(checks: &[VoltageCheck]) -> Option<Self> {
        if checks.is_empty() {
            return None;
        }
        let passed = checks.iter().filter(|c| c.passed()).count();
        Some(Self {
            total: checks.len(),
            passed,
            pass_rate: passed as f64 * 100.0 / checks.len() as f64,
        })
    }

    pub fn failed(&self) -> usize {
        self.total - self.passed
    }

    pub fn status(&self) -> ChipStatus {
        ChipStatus::from_rate(self.pass_rate)
    }

    pub fn render(&self) -> String {
        let mut out = String::from("=== Validation Summary ===\n");
        let _ = writeln!(out, "Total tests: {}", self.total);
        let _ = writeln!(out, "Passed: {}", self.passed);
        let _ = writeln!(out, "Failed: {}", self.failed());
        let _ = writeln!(out, "Pass rate: {:.1}%", self.pass_rate);
        let _ = writeln!(out, "Status: {}", self.status().describe());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_window() {
        let window = default_window();
        assert!((window.min - 1.71).abs() < 1e-12);
        assert!((window.max - 1.89).abs() < 1e-12);
    }

    #[test]
    fn test_pass_and_deviation_messages() {
        let window = Range::new(1.71, 1.89);
        let ok = check_voltage(1.8, window);
        assert!(ok.passed());
        assert_eq!(ok.render(), "✓ PASS: Voltage 1.80V is within acceptable range");

        let low = check_voltage(1.5, window);
        assert!(!low.passed());
        let text = low.render();
        assert!(text.starts_with("✗ FAIL: Voltage 1.50V is outside"), "Got: {text}");
        assert!(text.contains("→ Voltage is 0.21V below minimum (1.71V)"), "Got: {text}");

        let high = check_voltage(2.0, window);
        assert!(high.render().contains("Voltage is 0.11V above maximum (1.89V)"));
    }

    #[test]
    fn test_chip_status_thresholds() {
        assert_eq!(ChipStatus::from_rate(100.0), ChipStatus::Validated);
        assert_eq!(ChipStatus::from_rate(95.0), ChipStatus::Validated);
        assert_eq!(ChipStatus::from_rate(90.0), ChipStatus::Marginal);
        assert_eq!(ChipStatus::from_rate(89.9), ChipStatus::Failed);
    }

    #[test]
    fn test_summary() {
        let window = Range::new(1.71, 1.89);
        assert!(VoltageSummary::from_checks(&[]).is_none());

        let checks: Vec<_> = [1.75, 1.8, 1.85, 2.0]
            .iter()
            .map(|&v| check_voltage(v, window))
            .collect();
        let summary = VoltageSummary::from_checks(&checks).unwrap();
        assert_eq!(summary.passed, 3);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.pass_rate, 75.0);
        assert_eq!(summary.status(), ChipStatus::Failed);
        let text = summary.render();
        assert!(text.contains("Pass rate: 75.0%"));
        assert!(text.contains("CHIP FAILED"));
    }
}
