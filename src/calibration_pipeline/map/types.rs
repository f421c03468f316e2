//! Calibration map data types

use crate::calibration_pipeline::common::error::{CalibrationError, Result};

/// Represents a decoded 2D calibration map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalibrationTable {
    /// Row axis keys as stored in the image (e.g. engine speed)
    row_axis: Vec<u16>,
    /// Column axis keys as stored in the image (e.g. fuel quantity)
    col_axis: Vec<u16>,
    /// Row-major cell values, `row_axis.len() * col_axis.len()` entries
    cells: Vec<u16>,
}

impl CalibrationTable {
    /// Builds a table, checking that `cells` holds exactly one value per
    /// axis intersection.
    pub fn from_parts(row_axis: Vec<u16>, col_axis: Vec<u16>, cells: Vec<u16>) -> Result<Self> {
        if cells.len() != row_axis.len() * col_axis.len() {
            return Err(CalibrationError::InvalidDimensions(
                row_axis.len(),
                col_axis.len(),
            ));
        }

        Ok(Self {
            row_axis,
            col_axis,
            cells,
        })
    }

    pub fn row_axis(&self) -> &[u16] {
        &self.row_axis
    }

    pub fn col_axis(&self) -> &[u16] {
        &self.col_axis
    }

    pub fn rows(&self) -> usize {
        self.row_axis.len()
    }

    pub fn cols(&self) -> usize {
        self.col_axis.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> u16 {
        self.cells[row * self.cols() + col]
    }

    pub fn row(&self, row: usize) -> &[u16] {
        let cols = self.cols();
        &self.cells[row * cols..(row + 1) * cols]
    }

    pub fn cells(&self) -> &[u16] {
        &self.cells
    }
}

/// A (row key, column key) query into a calibration map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    pub row_key: f64,
    pub col_key: f64,
}

impl GridPoint {
    pub fn new(row_key: f64, col_key: f64) -> Self {
        Self { row_key, col_key }
    }
}
