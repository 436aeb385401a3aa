//! Defensive parsing of operator-supplied readings.
//!
//! Every reading arrives as text. It is rejected when empty, longer than
//! [`MAX_INPUT_LENGTH`], not entirely numeric, out of range for the
//! target type, or outside the caller's limits. Nothing is clamped or
//! defaulted.

use crate::rules::Range;
use std::num::IntErrorKind;
use thiserror::Error;

/// Size of the input buffer; inputs must leave room for a terminator.
pub const MAX_INPUT_LENGTH: usize = 256;

/// Separator between the fields of a multi-value reading.
pub const FIELD_SEPARATOR: char = ',';

/// Why a single input was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("invalid format, expected a numeric value")]
    InvalidFormat,
    #[error("value is out of acceptable range")]
    OutOfRange,
    #[error("input too long, maximum {} characters", MAX_INPUT_LENGTH - 1)]
    TooLong,
    #[error("empty input")]
    Empty,
    #[error("value causes overflow")]
    Overflow,
}

/// An [`InputError`] tied to the parameter it was read for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{parameter}: {kind}")]
pub struct FieldError {
    pub parameter: &'static str,
    #[source]
    pub kind: InputError,
}

fn precheck(input: &str) -> Result<&str, InputError> {
    let input = input.trim_end_matches(['\r', '\n']);
    if input.is_empty() {
        return Err(InputError::Empty);
    }
    if input.len() >= MAX_INPUT_LENGTH - 1 {
        return Err(InputError::TooLong);
    }
    // Leading blanks are tolerated, trailing characters are not.
    Ok(input.trim_start())
}

/// True when the digits before any exponent include a non-zero one.
fn has_significant_digit(text: &str) -> bool {
    text.split(['e', 'E'])
        .next()
        .is_some_and(|mantissa| mantissa.chars().any(|c| ('1'..='9').contains(&c)))
}

/// Parse a float that must lie within `limits`.
///
/// Magnitudes too large or too small to represent are reported as
/// [`InputError::Overflow`]; `nan` and `inf` fail the range check.
pub fn validate_float(input: &str, limits: Range) -> Result<f64, InputError> {
    let text = precheck(input)?;
    let value: f64 = text.parse().map_err(|_| InputError::InvalidFormat)?;

    let spelled_out = text.chars().any(|c| c.is_ascii_alphabetic() && !"eE".contains(c));
    if !spelled_out && (value.is_infinite() || (value == 0.0 && has_significant_digit(text))) {
        return Err(InputError::Overflow);
    }
    if !limits.contains(value) {
        return Err(InputError::OutOfRange);
    }
    Ok(value)
}

/// Parse a decimal `i32` in `min..=max`.
pub fn validate_int(input: &str, min: i32, max: i32) -> Result<i32, InputError> {
    let text = precheck(input)?;
    let value: i32 = text.parse().map_err(|e: std::num::ParseIntError| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => InputError::Overflow,
        _ => InputError::InvalidFormat,
    })?;
    if value < min || value > max {
        return Err(InputError::OutOfRange);
    }
    Ok(value)
}

/// Validate a comma-separated reading, one field per `(name, limits)` pair.
///
/// The field count must match exactly; a mismatch is reported against
/// the first missing or surplus parameter as [`InputError::InvalidFormat`].
pub fn validate_fields(
    text: &str,
    fields: &[(&'static str, Range)],
) -> Result<Vec<f64>, FieldError> {
    let parts: Vec<&str> = text.split(FIELD_SEPARATOR).collect();
    if parts.len() != fields.len() {
        let parameter = fields
            .get(parts.len())
            .map_or("reading", |(name, _)| *name);
        let kind = if text.trim().is_empty() {
            InputError::Empty
        } else {
            InputError::InvalidFormat
        };
        return Err(FieldError { parameter, kind });
    }

    parts
        .iter()
        .zip(fields)
        .map(|(part, &(parameter, limits))| {
            validate_float(part.trim(), limits).map_err(|kind| FieldError { parameter, kind })
        })
        .collect()
}
