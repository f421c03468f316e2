//! Calibration map reading module
//!
//! This module turns a firmware image into 16-bit words and extracts the
//! length-prefixed 2D maps stored in it.

mod reader;
mod length_prefixed_reader;
pub mod types;
pub mod word_buffer;

pub use reader::MapReader;
pub use length_prefixed_reader::LengthPrefixedMapReader;
pub use types::{CalibrationTable, GridPoint};
pub use word_buffer::{Endianness, WordBuffer};
