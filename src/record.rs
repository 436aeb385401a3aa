//! Test case records parsed from pipe-delimited input lines.
//!
//! A data line carries up to seven `|`-separated columns:
//!
//! ```text
//! test_id|description|voltage|current|expected_power|expected_result|category
//! TC001|Nominal operation|1.80|0.50|0.90|PASS|nominal
//! ```
//!
//! Columns past the seventh are ignored. Missing trailing columns leave the
//! attribute at its empty/zero default. String columns are cut to a fixed
//! number of characters.

use crate::error::{Result, ValidationError};
use serde::Deserialize;

/// Field separator for input lines.
pub const DELIMITER: char = '|';

/// Maximum stored characters for the test identifier.
pub const ID_WIDTH: usize = 31;
/// Maximum stored characters for the description.
pub const DESCRIPTION_WIDTH: usize = 127;
/// Maximum stored characters for the expected result label.
pub const RESULT_WIDTH: usize = 15;
/// Maximum stored characters for the category tag.
pub const CATEGORY_WIDTH: usize = 31;

/// How malformed numeric fields are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericPolicy {
    /// Parse the longest numeric prefix; 0.0 when there is none.
    #[default]
    Lenient,
    /// Reject the whole record when a numeric field is not a number.
    Strict,
}

/// One test case: nominal parameters and the expected outcome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub id: String,
    pub description: String,
    pub voltage: f64,
    pub current: f64,
    pub expected_power: f64,
    pub expected_result: String,
    pub category: String,
}

impl Record {
    /// Parse a data line with the lenient numeric policy.
    ///
    /// Never fails; unparseable numbers become 0.0.
    pub fn from_line(line: &str) -> Self {
        let mut fields = line.split(DELIMITER);
        let mut next = || fields.next().unwrap_or("");
        Record {
            id: truncate(next(), ID_WIDTH),
            description: truncate(next(), DESCRIPTION_WIDTH),
            voltage: parse_lenient(next()),
            current: parse_lenient(next()),
            expected_power: parse_lenient(next()),
            expected_result: truncate(next(), RESULT_WIDTH),
            category: truncate(next(), CATEGORY_WIDTH),
        }
    }

    /// Parse a data line under `policy`.
    ///
    /// `line_number` is 1-based and only used for error reporting. Empty
    /// (missing) numeric fields are accepted as 0.0 under both policies.
    pub fn parse_line(line: &str, policy: NumericPolicy, line_number: usize) -> Result<Self> {
        let record = Record::from_line(line);
        if policy == NumericPolicy::Strict {
            let columns: Vec<&str> = line.split(DELIMITER).collect();
            for (index, name) in [(2, "voltage"), (3, "current"), (4, "expected_power")] {
                let Some(raw) = columns.get(index) else {
                    continue;
                };
                if !raw.trim().is_empty() && parse_strict(raw).is_none() {
                    return Err(ValidationError::StrictParse {
                        line: line_number,
                        field: name,
                        value: raw.to_string(),
                    });
                }
            }
        }
        Ok(record)
    }

    /// Category tag, if one was given.
    pub fn category(&self) -> Option<&str> {
        if self.category.is_empty() {
            None
        } else {
            Some(&self.category)
        }
    }
}

/// Keep at most `max_chars` characters of `s`.
pub fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}

/// Convert the longest leading decimal number in `s`, like C `atof`.
///
/// Leading whitespace is skipped. Returns 0.0 when no digits are found.
pub fn parse_lenient(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return 0.0;
    }

    // Exponent only counts when at least one digit follows it.
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    match s[..end].parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Parse `s` as a complete finite number, ignoring surrounding whitespace.
pub fn parse_strict(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_line_all_fields() {
        let r = Record::from_line("TC001|Nominal|1.80|0.50|0.90|PASS|nominal");
        assert_eq!(r.id, "TC001");
        assert_eq!(r.description, "Nominal");
        assert_eq!(r.voltage, 1.8);
        assert_eq!(r.current, 0.5);
        assert_eq!(r.expected_power, 0.9);
        assert_eq!(r.expected_result, "PASS");
        assert_eq!(r.category(), Some("nominal"));
    }

    #[test]
    fn test_from_line_missing_trailing_fields() {
        let r = Record::from_line("TC002|Short line|1.75");
        assert_eq!(r.voltage, 1.75);
        assert_eq!(r.current, 0.0);
        assert_eq!(r.expected_power, 0.0);
        assert!(r.expected_result.is_empty());
        assert_eq!(r.category(), None);
    }

    #[test]
    fn test_from_line_extra_fields_ignored() {
        let r = Record::from_line("A|B|1|2|3|FAIL|cat|extra|more");
        assert_eq!(r.category, "cat");
        assert_eq!(r.expected_result, "FAIL");
    }

    #[test]
    fn test_truncate_long_fields() {
        let long_id = "X".repeat(50);
        let r = Record::from_line(&format!("{long_id}|d|1|1|1|PASS"));
        assert_eq!(r.id.chars().count(), ID_WIDTH);
        assert_eq!(truncate("PASSPASSPASSPASSPASS", RESULT_WIDTH).len(), RESULT_WIDTH);
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("µµµµ", 2), "µµ");
        assert_eq!(truncate("ab", 5), "ab");
    }

    #[test]
    fn test_parse_lenient_prefixes() {
        assert_eq!(parse_lenient("1.8"), 1.8);
        assert_eq!(parse_lenient("  1.8V"), 1.8);
        assert_eq!(parse_lenient("-0.5"), -0.5);
        assert_eq!(parse_lenient(".5"), 0.5);
        assert_eq!(parse_lenient("2e1x"), 20.0);
        assert_eq!(parse_lenient("3e"), 3.0);
    }

    #[test]
    fn test_parse_lenient_garbage_is_zero() {
        assert_eq!(parse_lenient("abc"), 0.0);
        assert_eq!(parse_lenient(""), 0.0);
        assert_eq!(parse_lenient("."), 0.0);
        assert_eq!(parse_lenient("-"), 0.0);
        assert_eq!(parse_lenient("inf"), 0.0);
    }

    #[test]
    fn test_parse_strict() {
        assert_eq!(parse_strict(" 1.25 "), Some(1.25));
        assert_eq!(parse_strict("1.8V"), None);
        assert_eq!(parse_strict("NaN"), None);
    }

    #[test]
    fn test_parse_line_strict_rejects_bad_voltage() {
        let err = Record::parse_line("T1|d|abc|0.5|0.9|PASS", NumericPolicy::Strict, 7)
            .unwrap_err();
        match err {
            ValidationError::StrictParse { line, field, value } => {
                assert_eq!(line, 7);
                assert_eq!(field, "voltage");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_line_lenient_accepts_bad_voltage() {
        let r = Record::parse_line("T1|d|abc|0.5|0.9|PASS", NumericPolicy::Lenient, 1).unwrap();
        assert_eq!(r.voltage, 0.0);
    }

    #[test]
    fn test_parse_line_strict_allows_missing_numbers() {
        let r = Record::parse_line("T1|d", NumericPolicy::Strict, 1).unwrap();
        assert_eq!(r.voltage, 0.0);
        assert_eq!(r.current, 0.0);
    }
}
