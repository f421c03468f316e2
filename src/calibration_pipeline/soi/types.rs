//! Derived table types

use serde::{Deserialize, Serialize};

/// SOI values computed over an output grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedTable {
    /// Engine speeds, one per row
    pub speed_axis: Vec<f64>,
    /// Fuel quantities, one per column
    pub fuel_axis: Vec<f64>,
    /// `cells[i][j]` is the SOI at (`speed_axis[i]`, `fuel_axis[j]`)
    pub cells: Vec<Vec<i64>>,
}

impl DerivedTable {
    pub fn rows(&self) -> usize {
        self.speed_axis.len()
    }

    pub fn cols(&self) -> usize {
        self.fuel_axis.len()
    }
}
