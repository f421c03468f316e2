//! Bilinear interpolation over a calibration map.
//!
//! Queries outside the axis domain are clamped to the nearest edge rather
//! than rejected, matching how the ECU itself reads its maps. An axis holding
//! a single key selects that row or column directly.

use crate::calibration_pipeline::common::error::{CalibrationError, Result};
use crate::calibration_pipeline::map::types::{CalibrationTable, GridPoint};

/// Indices of the two axis entries around a key and the weight of the upper one.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bracket {
    lower: usize,
    upper: usize,
    weight: f64,
}

#[derive(Debug)]
pub struct GridInterpolator<'a> {
    table: &'a CalibrationTable,
    row_axis: Vec<f64>,
    col_axis: Vec<f64>,
}

impl<'a> GridInterpolator<'a> {
    /// Prepares `table` for lookups.
    ///
    /// # Errors
    ///
    /// * `DegenerateAxis` - an axis has no keys
    /// * `NonMonotonicAxis` - an axis with two or more keys is not strictly increasing
    pub fn build(table: &'a CalibrationTable) -> Result<Self> {
        let row_axis = Self::prepare_axis("row", table.row_axis())?;
        let col_axis = Self::prepare_axis("column", table.col_axis())?;

        Ok(Self {
            table,
            row_axis,
            col_axis,
        })
    }

    fn prepare_axis(name: &'static str, raw: &[u16]) -> Result<Vec<f64>> {
        if raw.is_empty() {
            return Err(CalibrationError::DegenerateAxis(name));
        }
        if let Some(index) = raw.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(CalibrationError::NonMonotonicAxis {
                axis: name,
                index: index + 1,
            });
        }
        Ok(raw.iter().map(|&key| f64::from(key)).collect())
    }

    fn bracket(axis: &[f64], key: f64) -> Bracket {
        let last = axis.len() - 1;
        if last == 0 {
            return Bracket {
                lower: 0,
                upper: 0,
                weight: 0.0,
            };
        }

        let key = if key.is_nan() {
            axis[0]
        } else {
            key.clamp(axis[0], axis[last])
        };

        let lower = axis
            .partition_point(|&value| value <= key)
            .saturating_sub(1)
            .min(last - 1);
        let upper = lower + 1;
        let weight = (key - axis[lower]) / (axis[upper] - axis[lower]);

        Bracket {
            lower,
            upper,
            weight,
        }
    }

    fn lerp(from: f64, to: f64, weight: f64) -> f64 {
        from * (1.0 - weight) + to * weight
    }

    /// Interpolated value at (`row_key`, `col_key`).
    pub fn evaluate(&self, row_key: f64, col_key: f64) -> f64 {
        let row = Self::bracket(&self.row_axis, row_key);
        let col = Self::bracket(&self.col_axis, col_key);

        let along_cols = |r: usize| {
            Self::lerp(
                f64::from(self.table.cell(r, col.lower)),
                f64::from(self.table.cell(r, col.upper)),
                col.weight,
            )
        };

        Self::lerp(along_cols(row.lower), along_cols(row.upper), row.weight)
    }

    pub fn evaluate_point(&self, point: GridPoint) -> f64 {
        self.evaluate(point.row_key, point.col_key)
    }

    pub fn table(&self) -> &CalibrationTable {
        self.table
    }
}
