//! Derivation configuration types

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::calibration_pipeline::common::error::{CalibrationError, Result};
use crate::calibration_pipeline::map::word_buffer::Endianness;
use crate::calibration_pipeline::soi::validate_axis;

/// Output formats for a derived table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Right-aligned grid for terminals (default)
    #[default]
    Text,
    /// One record per speed, fuel quantities in the header
    Csv,
    /// Structured payload with both axes and the cell rows
    Json,
}

/// Configuration for a firmware to SOI derivation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivationConfig {
    /// Byte order of the words in the firmware image
    pub endianness: Endianness,
    /// Absolute byte offset of the rail pressure map (speed × fuel)
    pub pressure_offset: usize,
    /// Absolute byte offset of the injection duration map (pressure × fuel)
    pub duration_offset: usize,
    /// Engine speeds for the rows of the derived table
    pub speed_axis: Vec<f64>,
    /// Fuel quantities for the columns of the derived table
    pub fuel_axis: Vec<f64>,
    /// How the derived table is serialized
    pub output_format: OutputFormat,
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self {
            endianness: Endianness::Big,
            pressure_offset: 0,
            duration_offset: 0,
            speed_axis: Vec::new(),
            fuel_axis: Vec::new(),
            output_format: OutputFormat::Text,
        }
    }
}

impl DerivationConfig {
    pub fn builder() -> DerivationConfigBuilder {
        DerivationConfigBuilder::default()
    }

    /// Parses a TOML document. Missing keys fall back to their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| CalibrationError::ConfigError(e.to_string()))
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            CalibrationError::ConfigError(format!("{}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks that both output axes are non-empty and finite.
    pub fn validate(&self) -> Result<()> {
        validate_axis("speed", &self.speed_axis)?;
        validate_axis("fuel", &self.fuel_axis)
    }
}

/// Builder for DerivationConfig
#[derive(Default)]
pub struct DerivationConfigBuilder {
    endianness: Option<Endianness>,
    pressure_offset: Option<usize>,
    duration_offset: Option<usize>,
    speed_axis: Option<Vec<f64>>,
    fuel_axis: Option<Vec<f64>>,
    output_format: Option<OutputFormat>,
}

impl DerivationConfigBuilder {
    /// Starts from an existing configuration, e.g. one loaded from a file.
    pub fn from_config(config: DerivationConfig) -> Self {
        Self {
            endianness: Some(config.endianness),
            pressure_offset: Some(config.pressure_offset),
            duration_offset: Some(config.duration_offset),
            speed_axis: Some(config.speed_axis),
            fuel_axis: Some(config.fuel_axis),
            output_format: Some(config.output_format),
        }
    }

    pub fn endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = Some(endianness);
        self
    }

    pub fn pressure_offset(mut self, offset: usize) -> Self {
        self.pressure_offset = Some(offset);
        self
    }

    pub fn duration_offset(mut self, offset: usize) -> Self {
        self.duration_offset = Some(offset);
        self
    }

    pub fn speed_axis(mut self, axis: Vec<f64>) -> Self {
        self.speed_axis = Some(axis);
        self
    }

    pub fn fuel_axis(mut self, axis: Vec<f64>) -> Self {
        self.fuel_axis = Some(axis);
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn build(self) -> DerivationConfig {
        let default = DerivationConfig::default();
        DerivationConfig {
            endianness: self.endianness.unwrap_or(default.endianness),
            pressure_offset: self.pressure_offset.unwrap_or(default.pressure_offset),
            duration_offset: self.duration_offset.unwrap_or(default.duration_offset),
            speed_axis: self.speed_axis.unwrap_or(default.speed_axis),
            fuel_axis: self.fuel_axis.unwrap_or(default.fuel_axis),
            output_format: self.output_format.unwrap_or(default.output_format),
        }
    }
}
