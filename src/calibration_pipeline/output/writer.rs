use std::io::Write;
use crate::calibration_pipeline::common::error::Result;
use crate::calibration_pipeline::output::types::DerivationConfig;
use crate::calibration_pipeline::soi::types::DerivedTable;

pub trait TableWriter {
    fn write_table(&self, table: &DerivedTable, output: &mut dyn Write, config: &DerivationConfig) -> Result<()>;
}
