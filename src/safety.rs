//! Safety-margin analysis of chip readings.
//!
//! A reading is accepted only inside the hard limits. Within them, each
//! parameter is SAFE when it keeps [`SAFETY_MARGIN`] away from both bounds
//! and MARGINAL otherwise.

use crate::input::{self, FieldError};
use crate::rules::Range;
use crate::stats::ExactSum;
use std::fmt::Write as _;

/// Clearance required from every limit.
pub const SAFETY_MARGIN: f64 = 0.1;

/// Readings kept per run.
pub const MAX_READINGS: usize = 1000;

/// Hard operating limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyLimits {
    pub voltage: Range,
    pub current: Range,
    pub temperature: Range,
    pub max_power: f64,
}

impl Default for SafetyLimits {
    fn default() -> Self {
        Self {
            voltage: Range::new(1.5, 2.0),
            current: Range::new(0.1, 1.5),
            temperature: Range::new(-40.0, 85.0),
            max_power: 2.0,
        }
    }
}

fn inset(range: Range) -> Range {
    Range::new(range.min + SAFETY_MARGIN, range.max - SAFETY_MARGIN)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyLevel {
    Safe,
    Marginal,
}

impl SafetyLevel {
    fn from_safe(safe: bool) -> Self {
        if safe { SafetyLevel::Safe } else { SafetyLevel::Marginal }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SafetyLevel::Safe => "✓ SAFE",
            SafetyLevel::Marginal => "⚠ MARGINAL",
        }
    }
}

/// One accepted set of readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyReading {
    pub voltage: f64,
    pub current: f64,
    pub temperature: f64,
}

impl SafetyReading {
    /// Parse `voltage,current,temperature` against the hard limits.
    pub fn parse(text: &str, limits: &SafetyLimits) -> Result<Self, FieldError> {
        let values = input::validate_fields(
            text,
            &[
                ("voltage", limits.voltage),
                ("current", limits.current),
                ("temperature", limits.temperature),
            ],
        )?;
        Ok(Self {
            voltage: values[0],
            current: values[1],
            temperature: values[2],
        })
    }
}

/// Per-parameter safety levels of one reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyAnalysis {
    pub reading: SafetyReading,
    pub power: f64,
    pub voltage: SafetyLevel,
    pub current: SafetyLevel,
    pub temperature: SafetyLevel,
    pub power_level: SafetyLevel,
}

impl SafetyAnalysis {
    pub fn all_safe(&self) -> bool {
        [self.voltage, self.current, self.temperature, self.power_level]
            .iter()
            .all(|&level| level == SafetyLevel::Safe)
    }

    pub fn render(&self) -> String {
        let mut out = String::from("--- Safety Analysis ---\n");
        let r = &self.reading;
        let _ = writeln!(out, "Voltage: {:.2}V {}", r.voltage, self.voltage.label());
        let _ = writeln!(out, "Current: {:.2}A {}", r.current, self.current.label());
        let _ = writeln!(
            out,
            "Temperature: {:.1}°C {}",
            r.temperature,
            self.temperature.label()
        );
        let _ = writeln!(out, "Power: {:.3}W {}", self.power, self.power_level.label());
        out.push_str(if self.all_safe() {
            "Overall Status: ✓ ALL PARAMETERS SAFE\n"
        } else {
            "Overall Status: ⚠ SOME PARAMETERS MARGINAL\n"
        });
        out
    }
}

pub fn analyze(reading: SafetyReading, limits: &SafetyLimits) -> SafetyAnalysis {
    let power = reading.voltage * reading.current;
    SafetyAnalysis {
        reading,
        power,
        voltage: SafetyLevel::from_safe(inset(limits.voltage).contains(reading.voltage)),
        current: SafetyLevel::from_safe(inset(limits.current).contains(reading.current)),
        temperature: SafetyLevel::from_safe(
            inset(limits.temperature).contains(reading.temperature),
        ),
        power_level: SafetyLevel::from_safe(power <= limits.max_power - SAFETY_MARGIN),
    }
}

/// Overall verdict on the share of safe readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyAssessment {
    Excellent,
    Acceptable,
    Concerning,
}

impl SafetyAssessment {
    /// ≥95 excellent, ≥80 acceptable, otherwise concerning.
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 95.0 {
            SafetyAssessment::Excellent
        } else if rate >= 80.0 {
            SafetyAssessment::Acceptable
        } else {
            SafetyAssessment::Concerning
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            SafetyAssessment::Excellent => "✓ EXCELLENT - All parameters well within limits",
            SafetyAssessment::Acceptable => "⚠ ACCEPTABLE - Most parameters safe",
            SafetyAssessment::Concerning => "✗ CONCERNING - Many parameters near limits",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SafetySummary {
    pub total: usize,
    /// Readings with every parameter, power included, safe.
    pub safe: usize,
    pub average_voltage: f64,
    pub average_current: f64,
    pub average_temperature: f64,
    pub safety_rate: f64,
}

impl SafetySummary {
    /// `None` for an empty run.
    pub fn from_analyses(analyses: &[SafetyAnalysis]) -> Option<Self> {
        if analyses.is_empty() {
            return None;
        }
        let n = analyses.len() as f64;
        let average = |f: fn(&SafetyReading) -> f64| {
            let mut sum = ExactSum::new();
            sum.extend(analyses.iter().map(|a| f(&a.reading)));
            sum.value() / n
        };
        let safe = analyses.iter().filter(|a| a.all_safe()).count();
        Some(Self {
            total: analyses.len(),
            safe,
            average_voltage: average(|r| r.voltage),
            average_current: average(|r| r.current),
            average_temperature: average(|r| r.temperature),
            safety_rate: safe as f64 * 100.0 / n,
        })
    }

    pub fn assessment(&self) -> SafetyAssessment {
        SafetyAssessment::from_rate(self.safety_rate)
    }

    pub fn render(&self) -> String {
        let mut out = String::from("=== Safety Validation Summary ===\n");
        let _ = writeln!(out, "Total readings processed: {}", self.total);
        let _ = writeln!(out, "Average voltage: {:.2}V", self.average_voltage);
        let _ = writeln!(out, "Average current: {:.2}A", self.average_current);
        let _ = writeln!(out, "Average temperature: {:.1}°C", self.average_temperature);
        let _ = writeln!(
            out,
            "Safety rate: {:.1}% ({}/{} readings safe)",
            self.safety_rate, self.safe, self.total
        );
        let _ = writeln!(out, "Safety Assessment: {}", self.assessment().describe());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputError;

    fn reading(voltage: f64, current: f64, temperature: f64) -> SafetyReading {
        SafetyReading {
            voltage,
            current,
            temperature,
        }
    }

    #[test]
    fn test_nominal_reading_is_safe() {
        let analysis = analyze(reading(1.75, 0.5, 25.0), &SafetyLimits::default());
        assert!(analysis.all_safe());
        assert_eq!(analysis.power, 0.875);
        let text = analysis.render();
        assert!(text.contains("Voltage: 1.75V ✓ SAFE"), "Got: {text}");
        assert!(text.contains("Overall Status: ✓ ALL PARAMETERS SAFE"));
    }

    #[test]
    fn test_near_limits_are_marginal() {
        let limits = SafetyLimits::default();
        let analysis = analyze(reading(1.55, 0.5, 84.95), &limits);
        assert_eq!(analysis.voltage, SafetyLevel::Marginal);
        assert_eq!(analysis.current, SafetyLevel::Safe);
        assert_eq!(analysis.temperature, SafetyLevel::Marginal);
        assert!(!analysis.all_safe());
        assert!(analysis.render().contains("SOME PARAMETERS MARGINAL"));

        // 1.875 W keeps the margin below 2.0 W; 2.34 W does not.
        let hot = analyze(reading(1.875, 1.0, 25.0), &limits);
        assert_eq!(hot.voltage, SafetyLevel::Safe);
        assert_eq!(hot.power_level, SafetyLevel::Safe);
        let over = analyze(reading(1.875, 1.25, 25.0), &limits);
        assert_eq!(over.power_level, SafetyLevel::Marginal);
    }

    #[test]
    fn test_parse_enforces_hard_limits() {
        let limits = SafetyLimits::default();
        assert_eq!(
            SafetyReading::parse("1.8,0.5,25", &limits),
            Ok(reading(1.8, 0.5, 25.0))
        );
        let err = SafetyReading::parse("1.8,0.5,90", &limits).unwrap_err();
        assert_eq!(err.parameter, "temperature");
        assert_eq!(err.kind, InputError::OutOfRange);
        let err = SafetyReading::parse("1.8,,25", &limits).unwrap_err();
        assert_eq!(err.parameter, "current");
        assert_eq!(err.kind, InputError::Empty);
    }

    #[test]
    fn test_summary() {
        let limits = SafetyLimits::default();
        assert!(SafetySummary::from_analyses(&[]).is_none());

        let analyses = [
            analyze(reading(1.75, 0.5, 25.0), &limits),
            analyze(reading(1.75, 0.5, 25.0), &limits),
            analyze(reading(1.75, 0.5, 25.0), &limits),
            analyze(reading(1.5, 0.5, 25.0), &limits),
        ];
        let summary = SafetySummary::from_analyses(&analyses).unwrap();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.safe, 3);
        assert_eq!(summary.safety_rate, 75.0);
        assert_eq!(summary.average_voltage, 1.6875);
        assert_eq!(summary.average_temperature, 25.0);
        assert_eq!(summary.assessment(), SafetyAssessment::Concerning);
        let text = summary.render();
        assert!(text.contains("Safety rate: 75.0% (3/4 readings safe)"), "Got: {text}");
    }

    #[test]
    fn test_assessment_thresholds() {
        assert_eq!(SafetyAssessment::from_rate(95.0), SafetyAssessment::Excellent);
        assert_eq!(SafetyAssessment::from_rate(80.0), SafetyAssessment::Acceptable);
        assert_eq!(SafetyAssessment::from_rate(79.9), SafetyAssessment::Concerning);
    }
}
