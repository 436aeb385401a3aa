//! Rule evaluation for individual test cases.
//!
//! Each record gets a derived power (`voltage * current`) and three
//! independent threshold checks. The record passes only when all three
//! pass. Evaluation is pure and cannot fail.

use crate::record::Record;
use serde::Deserialize;

/// Label for a passing verdict.
pub const PASS: &str = "PASS";
/// Label for a failing verdict.
pub const FAIL: &str = "FAIL";

const VOLTAGE_NOTE: &str = "Voltage out of range; ";
const CURRENT_NOTE: &str = "Current out of range; ";
const POWER_NOTE: &str = "Power exceeds limit; ";
const ALL_PASS_NOTE: &str = "All parameters within specification";

/// Closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// True when `min <= value <= max`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// How far `value` falls outside the interval, if it does.
    pub fn deviation(&self, value: f64) -> Option<Deviation> {
        if value < self.min {
            Some(Deviation::Below {
                by: self.min - value,
                limit: self.min,
            })
        } else if value > self.max {
            Some(Deviation::Above {
                by: value - self.max,
                limit: self.max,
            })
        } else {
            None
        }
    }
}

/// Distance of an out-of-range value from the violated bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Deviation {
    Below { by: f64, limit: f64 },
    Above { by: f64, limit: f64 },
}

impl Deviation {
    /// e.g. `Voltage is 0.10V below minimum (1.71V)`.
    pub fn describe(&self, quantity: &str, unit: &str) -> String {
        match self {
            Deviation::Below { by, limit } => {
                format!("{quantity} is {by:.2}{unit} below minimum ({limit:.2}{unit})")
            }
            Deviation::Above { by, limit } => {
                format!("{quantity} is {by:.2}{unit} above maximum ({limit:.2}{unit})")
            }
        }
    }
}

/// Thresholds applied to every record.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// 1.8 V rail with ±5% tolerance.
    pub voltage: Range,
    pub current: Range,
    /// Upper bound on `voltage * current`, inclusive.
    pub max_power: f64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            voltage: Range::new(1.71, 1.89),
            current: Range::new(0.1, 1.5),
            max_power: 2.0,
        }
    }
}

/// A record together with its computed verdicts.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedRecord {
    pub record: Record,
    pub power: f64,
    pub voltage_pass: bool,
    pub current_pass: bool,
    pub power_pass: bool,
    pub overall_pass: bool,
    /// Whether the computed label equals the expected label exactly.
    pub matches_expected: bool,
}

impl EvaluatedRecord {
    /// "PASS" or "FAIL" for the aggregate verdict.
    pub fn actual_result(&self) -> &'static str {
        verdict_label(self.overall_pass)
    }

    /// Which checks failed, or a success message.
    pub fn notes(&self) -> String {
        if self.overall_pass {
            return ALL_PASS_NOTE.to_string();
        }
        let mut notes = String::new();
        if !self.voltage_pass {
            notes.push_str(VOLTAGE_NOTE);
        }
        if !self.current_pass {
            notes.push_str(CURRENT_NOTE);
        }
        if !self.power_pass {
            notes.push_str(POWER_NOTE);
        }
        notes
    }
}

/// Map a boolean verdict to its label.
pub fn verdict_label(pass: bool) -> &'static str {
    if pass { PASS } else { FAIL }
}

/// Evaluate one record against `limits`.
pub fn evaluate(record: &Record, limits: &Limits) -> EvaluatedRecord {
    let power = record.voltage * record.current;
    let voltage_pass = limits.voltage.contains(record.voltage);
    let current_pass = limits.current.contains(record.current);
    let power_pass = power <= limits.max_power;
    let overall_pass = voltage_pass && current_pass && power_pass;
    let matches_expected = verdict_label(overall_pass) == record.expected_result;

    EvaluatedRecord {
        record: record.clone(),
        power,
        voltage_pass,
        current_pass,
        power_pass,
        overall_pass,
        matches_expected,
    }
}

/// Evaluate every record, preserving order.
pub fn evaluate_all<'a, I>(records: I, limits: &Limits) -> Vec<EvaluatedRecord>
where
    I: IntoIterator<Item = &'a Record>,
{
    records.into_iter().map(|r| evaluate(r, limits)).collect()
}
