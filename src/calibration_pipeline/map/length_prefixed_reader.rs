//! Map reader for the length-prefixed layout used by the ECU firmware.
//!
//! A map is stored as consecutive words:
//!
//! ```text
//! [rows][cols][row axis: rows words][col axis: cols words][cells: rows * cols words]
//! ```
//!
//! Cells are row-major. Nothing marks the end of a map, so the reader reports
//! the word index just past the last cell.

use tracing::debug;

use crate::calibration_pipeline::common::error::{CalibrationError, Result};
use crate::calibration_pipeline::map::reader::MapReader;
use crate::calibration_pipeline::map::types::CalibrationTable;
use crate::calibration_pipeline::map::word_buffer::WordBuffer;

/// Number of header words (row count, column count) in front of each map.
const HEADER_WORDS: usize = 2;

pub struct LengthPrefixedMapReader;

impl LengthPrefixedMapReader {
    /// Borrows `count` words starting at `from`, failing at the first index
    /// that lies past the end of the buffer.
    fn read_span(buffer: &WordBuffer, from: usize, count: usize) -> Result<&[u16]> {
        let words = buffer.as_slice();
        match from.checked_add(count) {
            Some(end) if end <= words.len() => Ok(&words[from..end]),
            _ => Err(CalibrationError::DecodeOutOfBounds {
                index: from.max(words.len()),
                len: words.len(),
            }),
        }
    }
}

impl MapReader for LengthPrefixedMapReader {
    /// Reads one length-prefixed map starting at word index `start`.
    ///
    /// # Errors
    ///
    /// * `DecodeOutOfBounds` - the header or an axis runs past the buffer, or a
    ///   row starts at or after the last word
    /// * `ShortRow` - a row starts inside the buffer but is cut off by its end
    fn read_map(&self, buffer: &WordBuffer, start: usize) -> Result<(CalibrationTable, usize)> {
        let header = Self::read_span(buffer, start, HEADER_WORDS)?;
        let rows = header[0] as usize;
        let cols = header[1] as usize;

        debug!("Reading map at word {}: {}x{}", start, rows, cols);

        let row_axis = Self::read_span(buffer, start + HEADER_WORDS, rows)?.to_vec();
        let col_axis = Self::read_span(buffer, start + HEADER_WORDS + rows, cols)?.to_vec();

        let mut cursor = start + HEADER_WORDS + rows + cols;
        let len = buffer.len();

        // Bounded by what is left in the buffer so a garbage header cannot
        // trigger a huge allocation before the bounds check fires.
        let mut cells = Vec::with_capacity((rows * cols).min(len.saturating_sub(cursor)));

        for row in 0..rows {
            if cols > 0 && cursor >= len {
                return Err(CalibrationError::DecodeOutOfBounds { index: cursor, len });
            }
            if cursor + cols > len {
                return Err(CalibrationError::ShortRow {
                    row,
                    expected: cols,
                    available: len - cursor,
                });
            }
            cells.extend_from_slice(&buffer.as_slice()[cursor..cursor + cols]);
            cursor += cols;
        }

        debug!("Map at word {} ends at word {}", start, cursor);

        let table = CalibrationTable::from_parts(row_axis, col_axis, cells)?;
        Ok((table, cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration_pipeline::map::word_buffer::Endianness;

    fn buffer_from_words(words: &[u16]) -> WordBuffer {
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();
        WordBuffer::from_bytes(&bytes, Endianness::Big)
    }

    #[test]
    fn test_reads_map_and_reports_cursor() {
        let buffer = buffer_from_words(&[2, 2, 100, 200, 5, 15, 1, 2, 3, 4]);

        let (table, next) = LengthPrefixedMapReader.read_map(&buffer, 0).unwrap();

        assert_eq!(table.row_axis(), &[100, 200]);
        assert_eq!(table.col_axis(), &[5, 15]);
        assert_eq!(table.row(0), &[1, 2]);
        assert_eq!(table.row(1), &[3, 4]);
        assert_eq!(next, 10);
    }

    #[test]
    fn test_reads_map_at_offset_and_chains() {
        let buffer = buffer_from_words(&[
            0xFFFF, 0xFFFF, // padding
            1, 2, 7, 1, 2, 30, 40, // 1x2 map
            2, 1, 3, 4, 9, 5, 6, // 2x1 map
        ]);

        let (first, next) = LengthPrefixedMapReader.read_map(&buffer, 2).unwrap();
        assert_eq!(first.cells(), &[30, 40]);
        assert_eq!(next, 9);

        let (second, end) = LengthPrefixedMapReader.read_map(&buffer, next).unwrap();
        assert_eq!(second.row_axis(), &[3, 4]);
        assert_eq!(second.col_axis(), &[9]);
        assert_eq!(second.cells(), &[5, 6]);
        assert_eq!(end, buffer.len());
    }

    #[test]
    fn test_axis_past_end_is_out_of_bounds() {
        // Declares three rows, but only two words follow the header.
        let buffer = buffer_from_words(&[3, 1, 10, 20]);

        let result = LengthPrefixedMapReader.read_map(&buffer, 0);

        assert!(matches!(
            result.unwrap_err(),
            CalibrationError::DecodeOutOfBounds { index: 4, len: 4 }
        ));
    }

    #[test]
    fn test_header_past_end_is_out_of_bounds() {
        let buffer = buffer_from_words(&[2, 2, 1]);

        assert!(matches!(
            LengthPrefixedMapReader.read_map(&buffer, 2).unwrap_err(),
            CalibrationError::DecodeOutOfBounds { .. }
        ));
        assert!(matches!(
            LengthPrefixedMapReader.read_map(&buffer, usize::MAX).unwrap_err(),
            CalibrationError::DecodeOutOfBounds { .. }
        ));
    }

    #[test]
    fn test_truncated_row_is_short_row() {
        // Second row has only one of its two cells.
        let buffer = buffer_from_words(&[2, 2, 100, 200, 5, 15, 1, 2, 3]);

        let result = LengthPrefixedMapReader.read_map(&buffer, 0);

        assert!(matches!(
            result.unwrap_err(),
            CalibrationError::ShortRow {
                row: 1,
                expected: 2,
                available: 1
            }
        ));
    }

    #[test]
    fn test_missing_row_is_out_of_bounds() {
        // Axes present, body missing entirely.
        let buffer = buffer_from_words(&[2, 2, 100, 200, 5, 15]);

        let result = LengthPrefixedMapReader.read_map(&buffer, 0);

        assert!(matches!(
            result.unwrap_err(),
            CalibrationError::DecodeOutOfBounds { index: 6, len: 6 }
        ));
    }

    #[test]
    fn test_buffer_is_not_modified() {
        let buffer = buffer_from_words(&[1, 1, 5, 6, 7]);
        let before = buffer.clone();

        LengthPrefixedMapReader.read_map(&buffer, 0).unwrap();

        assert_eq!(buffer, before);
    }
}
