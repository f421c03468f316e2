use crate::calibration_pipeline::common::error::Result;
use crate::calibration_pipeline::map::types::CalibrationTable;
use crate::calibration_pipeline::map::word_buffer::WordBuffer;

pub trait MapReader {
    /// Reads one map starting at `start` and returns it with the word index
    /// just past its last cell.
    fn read_map(&self, buffer: &WordBuffer, start: usize) -> Result<(CalibrationTable, usize)>;
}
