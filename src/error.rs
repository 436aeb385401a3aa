//! Error types for loading, configuring, and reporting.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the validation library.
///
/// Field-level problems inside an otherwise readable input line are not
/// errors under the default lenient policy; they degrade to defaults.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The input path could not be opened.
    #[error("cannot open '{path}': {source}")]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Any other I/O failure (reading, writing a report).
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The detail report could not be written as CSV.
    #[error("CSV error on '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The TOML configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A numeric field failed to parse under the strict policy.
    #[error("line {line}: field '{field}' is not a number: '{value}'")]
    StrictParse {
        line: usize,
        field: &'static str,
        value: String,
    },

    /// A chip variant index was out of range.
    #[error("chip variant {index} not found ({available} loaded)")]
    VariantNotFound { index: usize, available: usize },

    /// A chip spec or measurement line could not be interpreted.
    #[error("line {line}: {message}")]
    InvalidSpecLine { line: usize, message: String },
}

impl ValidationError {
    /// Wrap an I/O failure on `path`.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ValidationError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_not_found_names_path() {
        let err = ValidationError::FileNotFound {
            path: PathBuf::from("missing.txt"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("missing.txt"), "Got: {msg}");
        assert!(msg.contains("no such file"), "Got: {msg}");
    }

    #[test]
    fn test_strict_parse_message() {
        let err = ValidationError::StrictParse {
            line: 4,
            field: "voltage",
            value: "abc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "line 4: field 'voltage' is not a number: 'abc'"
        );
    }
}
