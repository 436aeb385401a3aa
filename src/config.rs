//! Validator configuration, read from TOML.
//!
//! Every section is optional; omitted values fall back to the built-in
//! 1.8 V rail limits and loader defaults.
//!
//! ```toml
//! [limits]
//! voltage = { min = 1.71, max = 1.89 }
//! current = { min = 0.1, max = 1.5 }
//! max_power = 2.0
//!
//! [loader]
//! max_records = 10000
//! numeric_policy = "lenient"
//!
//! [[variants]]
//! name = "Chip Variant A"
//! nominal_voltage = 1.8
//! ```

use crate::error::{Result, ValidationError};
use crate::loader::LoaderConfig;
use crate::rules::Limits;
use crate::variant::ChipVariant;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub limits: Limits,
    pub loader: LoaderConfig,
    /// Chip variants available to multi-parameter validation.
    pub variants: Vec<ChipVariant>,
}

impl ValidatorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ValidationError::FileNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Variants from the file, or the default chip when none are listed.
    pub fn variants_or_default(&self) -> Vec<ChipVariant> {
        if self.variants.is_empty() {
            vec![ChipVariant::default()]
        } else {
            self.variants.clone()
        }
    }
}
