//! Start-of-injection derivation module
//!
//! Composes the rail pressure map and the injection duration map into a new
//! SOI map over a caller-chosen speed/fuel grid.

mod deriver;
pub mod types;

pub use deriver::{soi_value, SoiDeriver};
pub(crate) use deriver::validate_axis;
pub use types::DerivedTable;
