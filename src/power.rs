//! Power consumption readings and their classification.
//!
//! A reading is a voltage and current pair inside the supply's operating
//! range. Its power `V * I` is banded against fixed thresholds, and a run
//! of readings is summarised by total and average power.

use crate::input::{self, FieldError};
use crate::rules::{Deviation, Range};
use crate::stats::ExactSum;
use std::fmt::Write as _;

/// Power at or below this is efficient.
pub const EFFICIENT_THRESHOLD: f64 = 1.0;
/// Power at or below this is moderate.
pub const MODERATE_THRESHOLD: f64 = 1.5;

/// Operating envelope of the power supply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLimits {
    pub voltage: Range,
    pub current: Range,
    pub max_power: f64,
}

impl Default for PowerLimits {
    fn default() -> Self {
        Self {
            voltage: Range::new(1.5, 2.0),
            current: Range::new(0.1, 1.5),
            max_power: 2.0,
        }
    }
}

/// Consumption band of one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PowerClass {
    Efficient,
    Moderate,
    High,
    Excessive,
}

impl PowerClass {
    pub fn from_watts(power: f64, max_power: f64) -> Self {
        if power <= EFFICIENT_THRESHOLD {
            PowerClass::Efficient
        } else if power <= MODERATE_THRESHOLD {
            PowerClass::Moderate
        } else if power <= max_power {
            PowerClass::High
        } else {
            PowerClass::Excessive
        }
    }

    pub fn status_line(&self) -> &'static str {
        match self {
            PowerClass::Efficient => "✓ EFFICIENT - Low power consumption",
            PowerClass::Moderate => "⚠ MODERATE - Acceptable power consumption",
            PowerClass::High => "⚠ HIGH - Near maximum power limit",
            PowerClass::Excessive => "✗ EXCESSIVE - Exceeds power limit!",
        }
    }
}

/// A validated voltage/current pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerReading {
    pub voltage: f64,
    pub current: f64,
    pub power: f64,
}

impl PowerReading {
    pub fn new(voltage: f64, current: f64) -> Self {
        Self {
            voltage,
            current,
            power: voltage * current,
        }
    }

    /// Parse `voltage,current`, rejecting values outside `limits`.
    pub fn parse(text: &str, limits: &PowerLimits) -> Result<Self, FieldError> {
        let values = input::validate_fields(
            text,
            &[("voltage", limits.voltage), ("current", limits.current)],
        )?;
        Ok(Self::new(values[0], values[1]))
    }

    /// Watts per volt; `None` at zero volts.
    pub fn power_density(&self) -> Option<f64> {
        (self.voltage != 0.0).then(|| self.power / self.voltage)
    }

    pub fn class(&self, limits: &PowerLimits) -> PowerClass {
        PowerClass::from_watts(self.power, limits.max_power)
    }

    pub fn exceeds_limit(&self, limits: &PowerLimits) -> bool {
        self.power > limits.max_power
    }

    pub fn render(&self, limits: &PowerLimits) -> String {
        let mut out = String::from("--- Results ---\n");
        let _ = writeln!(out, "Voltage: {:.2}V", self.voltage);
        let _ = writeln!(out, "Current: {:.2}A", self.current);
        let _ = writeln!(out, "Power: {:.3}W", self.power);
        let _ = writeln!(out, "Status: {}", self.class(limits).status_line());
        if self.exceeds_limit(limits) {
            let _ = writeln!(
                out,
                "WARNING: Power {:.3}W exceeds limit of {:.2}W!",
                self.power, limits.max_power
            );
            out.push_str("Chip may overheat or damage power supply.\n");
        }
        if let Some(density) = self.power_density() {
            let _ = writeln!(out, "Power density: {density:.3}W/V");
        }
        out
    }
}

/// Explain why a raw voltage or current would be refused.
pub fn describe_out_of_range(
    quantity: &str,
    unit: &str,
    value: f64,
    range: Range,
) -> Option<String> {
    range
        .deviation(value)
        .map(|d: Deviation| format!("{quantity} {value:.2}{unit}: {}", d.describe(quantity, unit)))
}

/// Overall verdict on a run's average power.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EfficiencyAssessment {
    Efficient,
    Moderate,
    High,
}

impl EfficiencyAssessment {
    pub fn from_average(average: f64) -> Self {
        if average <= EFFICIENT_THRESHOLD {
            EfficiencyAssessment::Efficient
        } else if average <= MODERATE_THRESHOLD {
            EfficiencyAssessment::Moderate
        } else {
            EfficiencyAssessment::High
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            EfficiencyAssessment::Efficient => {
                "✓ EFFICIENT DESIGN\nChip demonstrates excellent power efficiency."
            }
            EfficiencyAssessment::Moderate => {
                "⚠ MODERATE EFFICIENCY\nChip power consumption is acceptable."
            }
            EfficiencyAssessment::High => {
                "⚠ HIGH POWER CONSUMPTION\nConsider power optimization techniques."
            }
        }
    }
}

/// Totals over a run of power readings.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerSummary {
    pub count: usize,
    pub total_power: f64,
    pub average_power: f64,
    /// Average power as a percentage of the limit.
    pub budget_utilization: f64,
}

impl PowerSummary {
    /// `None` for an empty run.
    pub fn from_readings(readings: &[PowerReading], limits: &PowerLimits) -> Option<Self> {
        if readings.is_empty() {
            return None;
        }
        let mut sum = ExactSum::new();
        sum.extend(readings.iter().map(|r| r.power));
        let total_power = sum.value();
        let average_power = total_power / readings.len() as f64;
        Some(Self {
            count: readings.len(),
            total_power,
            average_power,
            budget_utilization: average_power / limits.max_power * 100.0,
        })
    }

    pub fn assessment(&self) -> EfficiencyAssessment {
        EfficiencyAssessment::from_average(self.average_power)
    }

    pub fn render(&self) -> String {
        let mut out = String::from("=== Power Analysis Summary ===\n");
        let _ = writeln!(out, "Total calculations: {}", self.count);
        let _ = writeln!(out, "Total power consumption: {:.3}W", self.total_power);
        let _ = writeln!(out, "Average power consumption: {:.3}W", self.average_power);
        let _ = writeln!(out, "Overall Assessment: {}", self.assessment().describe());
        let _ = writeln!(out, "Power budget utilization: {:.1}%", self.budget_utilization);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputError;

    #[test]
    fn test_power_bands() {
        let max = 2.0;
        assert_eq!(PowerClass::from_watts(0.9, max), PowerClass::Efficient);
        assert_eq!(PowerClass::from_watts(1.0, max), PowerClass::Efficient);
        assert_eq!(PowerClass::from_watts(1.25, max), PowerClass::Moderate);
        assert_eq!(PowerClass::from_watts(1.5, max), PowerClass::Moderate);
        assert_eq!(PowerClass::from_watts(2.0, max), PowerClass::High);
        assert_eq!(PowerClass::from_watts(2.25, max), PowerClass::Excessive);
    }

    #[test]
    fn test_reading_parse_and_render() {
        let limits = PowerLimits::default();
        let reading = PowerReading::parse("1.8,0.5", &limits).unwrap();
        assert!((reading.power - 0.9).abs() < 1e-12);
        assert_eq!(reading.class(&limits), PowerClass::Efficient);
        assert!((reading.power_density().unwrap() - 0.5).abs() < 1e-12);

        let text = reading.render(&limits);
        assert!(text.contains("Power: 0.900W"), "Got: {text}");
        assert!(text.contains("Status: ✓ EFFICIENT"));
        assert!(text.contains("Power density: 0.500W/V"));
        assert!(!text.contains("WARNING"));
    }

    #[test]
    fn test_over_limit_warning() {
        let limits = PowerLimits::default();
        let reading = PowerReading::parse("2.0,1.5", &limits).unwrap();
        assert!(reading.exceeds_limit(&limits));
        let text = reading.render(&limits);
        assert!(text.contains("EXCESSIVE"));
        assert!(text.contains("WARNING: Power 3.000W exceeds limit of 2.00W!"), "Got: {text}");
    }

    #[test]
    fn test_reading_rejects_out_of_envelope() {
        let limits = PowerLimits::default();
        let err = PowerReading::parse("1.4,0.5", &limits).unwrap_err();
        assert_eq!(err.parameter, "voltage");
        assert_eq!(err.kind, InputError::OutOfRange);
        assert_eq!(
            describe_out_of_range("Voltage", "V", 1.25, limits.voltage).unwrap(),
            "Voltage 1.25V: Voltage is 0.25V below minimum (1.50V)"
        );
        assert!(describe_out_of_range("Current", "A", 0.5, limits.current).is_none());
    }

    #[test]
    fn test_zero_volts_has_no_density() {
        assert_eq!(PowerReading::new(0.0, 1.0).power_density(), None);
    }

    #[test]
    fn test_summary() {
        let limits = PowerLimits::default();
        assert!(PowerSummary::from_readings(&[], &limits).is_none());

        let readings = [PowerReading::new(2.0, 1.0), PowerReading::new(1.75, 1.0)];
        let summary = PowerSummary::from_readings(&readings, &limits).unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.total_power, 3.75);
        assert_eq!(summary.average_power, 1.875);
        assert_eq!(summary.assessment(), EfficiencyAssessment::High);
        assert_eq!(summary.budget_utilization, 93.75);

        let text = summary.render();
        assert!(text.contains("Total power consumption: 3.750W"));
        assert!(text.contains("HIGH POWER CONSUMPTION"));
        assert!(text.contains("Power budget utilization: 93.8%"), "Got: {text}");

        let moderate = [PowerReading::new(2.0, 0.5), PowerReading::new(2.0, 1.0)];
        let summary = PowerSummary::from_readings(&moderate, &limits).unwrap();
        assert_eq!(summary.assessment(), EfficiencyAssessment::Moderate);
    }
}
