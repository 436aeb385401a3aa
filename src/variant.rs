//! Chip variants and multi-parameter validation.
//!
//! A chip variant carries the nominal operating point of one part. A set
//! of measurements is validated against it parameter by parameter, each
//! with its own expected value and tolerance window; the chip passes when
//! at least 80% of the parameters pass.
//!
//! Variants are loaded from a spec file of the form:
//!
//! ```text
//! # Chip specifications
//! [CHIP_VARIANT_A]
//! voltage=1.8
//! max_current=1.0
//! max_power=1.8
//! max_temp=85
//! frequency=500
//! ```

use crate::error::{Result, ValidationError};
use crate::record::{DELIMITER, parse_strict};
use crate::rules::Range;
use serde::Deserialize;

/// Most variants read from one spec file; later sections are ignored.
pub const MAX_CHIP_VARIANTS: usize = 10;

/// Score at or above which a chip passes.
pub const CHIP_PASS_SCORE: f64 = 80.0;

const SECTION_PREFIX: &str = "[CHIP_VARIANT_";
const AMBIENT_TEMPERATURE: f64 = 25.0;

/// Nominal operating point of one chip variant.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChipVariant {
    pub name: String,
    pub nominal_voltage: f64,
    pub max_current: f64,
    pub max_power: f64,
    pub max_temperature: f64,
    pub min_frequency: f64,
    pub max_frequency: f64,
}

impl Default for ChipVariant {
    fn default() -> Self {
        Self {
            name: "Default Chip".to_string(),
            nominal_voltage: 1.8,
            max_current: 1.0,
            max_power: 1.8,
            max_temperature: 85.0,
            min_frequency: 100.0,
            max_frequency: 1000.0,
        }
    }
}

impl ChipVariant {
    fn named(id: &str) -> Self {
        Self {
            name: format!("Chip Variant {id}"),
            nominal_voltage: 0.0,
            max_current: 0.0,
            max_power: 0.0,
            max_temperature: 0.0,
            min_frequency: 0.0,
            max_frequency: 0.0,
        }
    }

    /// Centre of the operating frequency band.
    pub fn nominal_frequency(&self) -> f64 {
        (self.min_frequency + self.max_frequency) / 2.0
    }
}

/// `nominal * (1 ∓ tolerance_percent / 100)`.
pub fn tolerance_window(nominal: f64, tolerance_percent: f64) -> Range {
    let lo = nominal * (1.0 - tolerance_percent / 100.0);
    let hi = nominal * (1.0 + tolerance_percent / 100.0);
    // A negative nominal flips the window.
    if lo <= hi { Range::new(lo, hi) } else { Range::new(hi, lo) }
}

/// Signed deviation of `measured` from `expected`, in percent.
///
/// Returns 0.0 when `expected` is zero.
pub fn percentage_error(measured: f64, expected: f64) -> f64 {
    if expected == 0.0 {
        0.0
    } else {
        (measured - expected) / expected * 100.0
    }
}

/// Outcome of checking one parameter against its tolerance window.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterResult {
    pub name: &'static str,
    pub measured: f64,
    pub expected: f64,
    pub tolerance_percent: f64,
    pub deviation_percent: f64,
    pub is_valid: bool,
}

impl ParameterResult {
    /// Status line, e.g. `Voltage: 1.850 (expected: 1.800 ±5.0%) PASS`.
    pub fn status_message(&self) -> String {
        format!(
            "{}: {:.3} (expected: {:.3} ±{:.1}%) {}",
            self.name,
            self.measured,
            self.expected,
            self.tolerance_percent,
            if self.is_valid { "PASS" } else { "FAIL" }
        )
    }
}

/// Check `measured` against `expected ± tolerance_percent`.
pub fn validate_parameter(
    name: &'static str,
    measured: f64,
    expected: f64,
    tolerance_percent: f64,
) -> ParameterResult {
    ParameterResult {
        name,
        measured,
        expected,
        tolerance_percent,
        deviation_percent: percentage_error(measured, expected),
        is_valid: tolerance_window(expected, tolerance_percent).contains(measured),
    }
}

/// Check a voltage reading against a nominal rail.
pub fn validate_voltage(voltage: f64, nominal: f64, tolerance_percent: f64) -> ParameterResult {
    validate_parameter("Voltage", voltage, nominal, tolerance_percent)
}

/// One set of measurements taken from a chip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub voltage: f64,
    pub current: f64,
    pub temperature: f64,
    pub frequency: f64,
}

impl Measurement {
    /// Parse `voltage|current|temperature|frequency`.
    pub fn parse(line: &str, line_number: usize) -> Result<Self> {
        let fields: Vec<&str> = line.split(DELIMITER).collect();
        if fields.len() < 4 {
            return Err(ValidationError::InvalidSpecLine {
                line: line_number,
                message: format!("expected 4 fields, found {}", fields.len()),
            });
        }
        let number = |index: usize, field: &'static str| {
            parse_strict(fields[index]).ok_or_else(|| ValidationError::StrictParse {
                line: line_number,
                field,
                value: fields[index].to_string(),
            })
        };
        Ok(Self {
            voltage: number(0, "voltage")?,
            current: number(1, "current")?,
            temperature: number(2, "temperature")?,
            frequency: number(3, "frequency")?,
        })
    }
}

/// Parse a measurements file, skipping blank and `#` lines.
pub fn parse_measurements(text: &str) -> Result<Vec<Measurement>> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| Measurement::parse(line, n))
        .collect()
}

/// Per-parameter results for one chip.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiValidation {
    pub chip_name: String,
    pub voltage: ParameterResult,
    pub current: ParameterResult,
    pub power: ParameterResult,
    pub temperature: ParameterResult,
    pub frequency: ParameterResult,
}

impl MultiValidation {
    pub fn parameters(&self) -> [&ParameterResult; 5] {
        [
            &self.voltage,
            &self.current,
            &self.power,
            &self.temperature,
            &self.frequency,
        ]
    }

    pub fn passed_parameters(&self) -> usize {
        self.parameters().iter().filter(|p| p.is_valid).count()
    }

    /// Share of passing parameters, in percent.
    pub fn score(&self) -> f64 {
        (self.passed_parameters() * 100) as f64 / 5.0
    }

    pub fn chip_passes(&self) -> bool {
        self.score() >= CHIP_PASS_SCORE
    }

    /// Human-readable report for one chip.
    pub fn render(&self) -> String {
        let mut out = format!("=== Validation Report: {} ===\nParameter Analysis:\n", self.chip_name);
        for p in self.parameters() {
            out.push_str(&format!("  {}\n", p.status_message()));
            if !p.is_valid {
                out.push_str(&format!(
                    "    Deviation: {:.1}% (outside tolerance)\n",
                    p.deviation_percent
                ));
            }
        }
        out.push_str(&format!(
            "\nSummary:\n  Parameters passed: {}/5\n  Overall score: {:.1}%\n  Chip status: {}\n",
            self.passed_parameters(),
            self.score(),
            if self.chip_passes() { "PASS" } else { "FAIL" }
        ));
        if self.chip_passes() {
            let grade = if self.score() >= 95.0 {
                "EXCELLENT"
            } else if self.score() >= 90.0 {
                "GOOD"
            } else {
                "ACCEPTABLE"
            };
            out.push_str(&format!("  Quality grade: {grade}\n"));
        } else {
            out.push_str("  Recommendation: REJECT - Parameters outside specifications\n");
        }
        out
    }
}

/// Validate all five parameters of `m` against `variant`.
pub fn validate_chip(variant: &ChipVariant, m: &Measurement) -> MultiValidation {
    MultiValidation {
        chip_name: variant.name.clone(),
        voltage: validate_voltage(m.voltage, variant.nominal_voltage, 5.0),
        current: validate_parameter("Current", m.current, variant.max_current * 0.8, 10.0),
        power: validate_parameter("Power", m.voltage * m.current, variant.max_power * 0.7, 15.0),
        temperature: validate_parameter("Temperature", m.temperature, AMBIENT_TEMPERATURE, 20.0),
        frequency: validate_parameter("Frequency", m.frequency, variant.nominal_frequency(), 10.0),
    }
}

/// Manufacturing process assessment across many chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessAssessment {
    Excellent,
    Good,
    Marginal,
    Poor,
}

impl ProcessAssessment {
    /// ≥95 excellent, ≥85 good, ≥70 marginal, otherwise poor.
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 95.0 {
            ProcessAssessment::Excellent
        } else if rate >= 85.0 {
            ProcessAssessment::Good
        } else if rate >= 70.0 {
            ProcessAssessment::Marginal
        } else {
            ProcessAssessment::Poor
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ProcessAssessment::Excellent => "EXCELLENT - Manufacturing process is well controlled",
            ProcessAssessment::Good => "GOOD - Manufacturing process is acceptable",
            ProcessAssessment::Marginal => "MARGINAL - Manufacturing process needs attention",
            ProcessAssessment::Poor => "POOR - Manufacturing process requires immediate review",
        }
    }
}

/// Aggregate over many chip validations.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiSummary {
    pub total: usize,
    pub chips_passed: usize,
    pub pass_rate: f64,
    pub average_score: f64,
    /// Pass counts for voltage, current, power, temperature, frequency.
    pub parameter_passes: [usize; 5],
}

impl MultiSummary {
    /// `None` when `results` is empty.
    pub fn from_results(results: &[MultiValidation]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }
        let mut chips_passed = 0;
        let mut total_score = 0.0;
        let mut parameter_passes = [0usize; 5];
        for r in results {
            if r.chip_passes() {
                chips_passed += 1;
            }
            total_score += r.score();
            for (count, p) in parameter_passes.iter_mut().zip(r.parameters()) {
                if p.is_valid {
                    *count += 1;
                }
            }
        }
        let n = results.len() as f64;
        Some(Self {
            total: results.len(),
            chips_passed,
            pass_rate: chips_passed as f64 * 100.0 / n,
            average_score: total_score / n,
            parameter_passes,
        })
    }

    pub fn assessment(&self) -> ProcessAssessment {
        ProcessAssessment::from_rate(self.pass_rate)
    }

    pub fn render(&self) -> String {
        const NAMES: [&str; 5] = ["Voltage", "Current", "Power", "Temperature", "Frequency"];
        let mut out = format!(
            "=== Multi-Parameter Validation Summary ===\nTotal tests performed: {}\nChips passed: {}/{} ({:.1}%)\nAverage score: {:.1}%\n\nParameter-specific pass rates:\n",
            self.total, self.chips_passed, self.total, self.pass_rate, self.average_score
        );
        for (name, count) in NAMES.iter().zip(self.parameter_passes) {
            out.push_str(&format!(
                "  {name}: {count}/{} ({:.1}%)\n",
                self.total,
                count as f64 / self.total as f64 * 100.0
            ));
        }
        out.push_str(&format!("\nOverall Assessment: {}\n", self.assessment().describe()));
        out
    }
}

/// Parse a chip spec file into variants.
///
/// Unknown keys are ignored. A `key=value` line before any section
/// header is an error. Sections past [`MAX_CHIP_VARIANTS`] are dropped.
pub fn parse_chip_specs(text: &str) -> Result<Vec<ChipVariant>> {
    let mut variants: Vec<ChipVariant> = Vec::new();
    let mut skipping = false;

    for (index, raw) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix(SECTION_PREFIX) {
            let Some(id) = rest.strip_suffix(']') else {
                return Err(ValidationError::InvalidSpecLine {
                    line: line_number,
                    message: format!("unterminated section header '{line}'"),
                });
            };
            if variants.len() >= MAX_CHIP_VARIANTS {
                skipping = true;
                continue;
            }
            variants.push(ChipVariant::named(id));
            continue;
        }
        if skipping {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(ValidationError::InvalidSpecLine {
                line: line_number,
                message: format!("expected key=value, found '{line}'"),
            });
        };
        let Some(variant) = variants.last_mut() else {
            return Err(ValidationError::InvalidSpecLine {
                line: line_number,
                message: "parameter outside a [CHIP_VARIANT_*] section".to_string(),
            });
        };
        let value = parse_strict(value).ok_or_else(|| ValidationError::InvalidSpecLine {
            line: line_number,
            message: format!("'{}' is not a number", value.trim()),
        })?;

        match key.trim() {
            "voltage" => variant.nominal_voltage = value,
            "max_current" => variant.max_current = value,
            "max_power" => variant.max_power = value,
            "max_temp" => variant.max_temperature = value,
            "frequency" => {
                variant.min_frequency = value * 0.8;
                variant.max_frequency = value * 1.2;
            }
            _ => {}
        }
    }

    Ok(variants)
}

/// Look up a variant by index.
pub fn select_variant(variants: &[ChipVariant], index: usize) -> Result<&ChipVariant> {
    variants.get(index).ok_or(ValidationError::VariantNotFound {
        index,
        available: variants.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPECS: &str = "\
# Chip specifications
[CHIP_VARIANT_A]
voltage=1.8
max_current=1.0
max_power=1.8
max_temp=85
frequency=500

[CHIP_VARIANT_B]
voltage=3.3
max_current=0.5
max_power=1.5
vendor_code=7
";

    fn nominal() -> Measurement {
        Measurement {
            voltage: 1.8,
            current: 0.8,
            temperature: 25.0,
            frequency: 520.0,
        }
    }

    #[test]
    fn test_tolerance_window() {
        let w = tolerance_window(1.8, 5.0);
        assert!((w.min - 1.71).abs() < 1e-12);
        assert!((w.max - 1.89).abs() < 1e-12);
        let neg = tolerance_window(-10.0, 10.0);
        assert!(neg.min < neg.max);
    }

    #[test]
    fn test_percentage_error() {
        assert!((percentage_error(1.89, 1.8) - 5.0).abs() < 1e-9);
        assert_eq!(percentage_error(1.0, 0.0), 0.0);
    }

    #[test]
    fn test_validate_voltage_status() {
        let ok = validate_voltage(1.85, 1.8, 5.0);
        assert!(ok.is_valid);
        assert_eq!(ok.status_message(), "Voltage: 1.850 (expected: 1.800 ±5.0%) PASS");
        assert!(!validate_voltage(1.5, 1.8, 5.0).is_valid);
    }

    #[test]
    fn test_parse_chip_specs() {
        let variants = parse_chip_specs(SPECS).unwrap();
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].name, "Chip Variant A");
        assert_eq!(variants[0].nominal_voltage, 1.8);
        assert_eq!(variants[0].max_temperature, 85.0);
        assert_eq!(variants[0].min_frequency, 400.0);
        assert_eq!(variants[0].max_frequency, 600.0);
        assert_eq!(variants[1].name, "Chip Variant B");
        assert_eq!(variants[1].max_current, 0.5);
    }

    #[test]
    fn test_parse_chip_specs_caps_variants() {
        let text: String = (0..12)
            .map(|i| format!("[CHIP_VARIANT_{i}]\nvoltage=1.{i}\n"))
            .collect();
        let variants = parse_chip_specs(&text).unwrap();
        assert_eq!(variants.len(), MAX_CHIP_VARIANTS);
        assert_eq!(variants[9].name, "Chip Variant 9");
    }

    #[test]
    fn test_parse_chip_specs_rejects_orphan_parameter() {
        let err = parse_chip_specs("voltage=1.8\n").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidSpecLine { line: 1, .. }));
    }

    #[test]
    fn test_parse_chip_specs_rejects_bad_number() {
        let err = parse_chip_specs("[CHIP_VARIANT_A]\nvoltage=high\n").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidSpecLine { line: 2, .. }));
    }

    #[test]
    fn test_validate_chip_all_pass() {
        let result = validate_chip(&parse_chip_specs(SPECS).unwrap()[0], &nominal());
        // power 1.44 W against 1.26 W ±15%
        assert_eq!(result.passed_parameters(), 5);
        assert_eq!(result.score(), 100.0);
        assert!(result.chip_passes());
        assert!(result.render().contains("Quality grade: EXCELLENT"));
    }

    #[test]
    fn test_validate_chip_one_failure_still_passes() {
        let m = Measurement {
            temperature: 60.0,
            ..nominal()
        };
        let result = validate_chip(&parse_chip_specs(SPECS).unwrap()[0], &m);
        assert!(!result.temperature.is_valid);
        assert_eq!(result.score(), 80.0);
        assert!(result.chip_passes());
        assert!(result.render().contains("Deviation: 140.0% (outside tolerance)"));
    }

    #[test]
    fn test_validate_chip_rejects() {
        let m = Measurement {
            voltage: 2.5,
            current: 2.0,
            temperature: 25.0,
            frequency: 550.0,
        };
        let result = validate_chip(&ChipVariant::default(), &m);
        assert!(!result.chip_passes());
        assert!(result.render().contains("REJECT"));
    }

    #[test]
    fn test_multi_summary() {
        let variant = parse_chip_specs(SPECS).unwrap().remove(0);
        let bad = Measurement {
            voltage: 0.0,
            current: 0.0,
            temperature: 25.0,
            frequency: 0.0,
        };
        let results = vec![
            validate_chip(&variant, &nominal()),
            validate_chip(&variant, &bad),
        ];
        let summary = MultiSummary::from_results(&results).unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.chips_passed, 1);
        assert_eq!(summary.pass_rate, 50.0);
        assert_eq!(summary.parameter_passes, [1, 1, 1, 2, 1]);
        assert_eq!(summary.assessment(), ProcessAssessment::Poor);
        assert!(summary.render().contains("Temperature: 2/2 (100.0%)"));
        assert!(MultiSummary::from_results(&[]).is_none());
    }

    #[test]
    fn test_parse_measurements() {
        let text = "# v|i|t|f\n1.8|0.7|25|550\n\n3.3|0.4|40|900\n";
        let m = parse_measurements(text).unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m[1].frequency, 900.0);
        assert!(parse_measurements("1.8|0.7|25\n").is_err());
        assert!(parse_measurements("1.8|x|25|500\n").is_err());
    }

    #[test]
    fn test_select_variant() {
        let variants = vec![ChipVariant::default()];
        assert_eq!(select_variant(&variants, 0).unwrap().name, "Default Chip");
        let err = select_variant(&variants, 3).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::VariantNotFound { index: 3, available: 1 }
        ));
    }
}
