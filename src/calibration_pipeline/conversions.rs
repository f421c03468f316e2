//! Pipeline conversions module
//!
//! This module contains orchestration logic from firmware image to derived table.

mod firmware_to_soi;

pub use firmware_to_soi::FirmwareToSoiPipeline;
