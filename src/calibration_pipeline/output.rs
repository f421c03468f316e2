//! Derived table output module
//!
//! This module provides derivation configuration and serialization of derived
//! tables as rendered text, CSV or JSON.

mod writer;
mod standard_table_writer;
pub mod types;

pub use writer::TableWriter;
pub use standard_table_writer::StandardTableWriter;
pub use types::{DerivationConfig, DerivationConfigBuilder, OutputFormat};
