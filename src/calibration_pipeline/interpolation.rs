//! Interpolation module
//!
//! Bilinear lookups over decoded calibration maps.

mod grid;

pub use grid::GridInterpolator;
