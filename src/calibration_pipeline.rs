//! Calibration pipeline module
//!
//! This module provides a structured approach to deriving SOI maps from ECU
//! firmware, with separate modules for map reading, interpolation, SOI
//! derivation, output writing, and pipeline orchestration.

pub mod map;
pub mod interpolation;
pub mod soi;
pub mod output;
pub mod conversions;
pub mod common;

pub use common::{
    CalibrationError,
    Result,
};

pub use map::{
    CalibrationTable,
    Endianness,
    GridPoint,
    LengthPrefixedMapReader,
    MapReader,
    WordBuffer,
};

pub use interpolation::GridInterpolator;

pub use soi::{
    soi_value,
    DerivedTable,
    SoiDeriver,
};

pub use output::{
    DerivationConfig,
    DerivationConfigBuilder,
    OutputFormat,
    StandardTableWriter,
    TableWriter,
};

pub use conversions::{
    FirmwareToSoiPipeline,
};
