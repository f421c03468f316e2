#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use crate::calibration_pipeline::common::error::{CalibrationError, Result};
use crate::calibration_pipeline::interpolation::GridInterpolator;
use crate::calibration_pipeline::map::types::CalibrationTable;
use crate::calibration_pipeline::soi::types::DerivedTable;

/// rpm × µs divided by this gives crank degrees (1e6 / 6).
const DURATION_SCALE: f64 = 166_666.67;

/// Crank degrees per SOI count.
const SOI_RESOLUTION: f64 = 0.023438;

/// Applies the SOI formula to an engine speed and an injection duration.
///
/// The speed is halved before use and the result is truncated toward zero;
/// both follow the existing calibration formula bit for bit.
pub fn soi_value(speed: f64, duration: f64) -> i64 {
    ((speed / 2.0) * duration / DURATION_SCALE / SOI_RESOLUTION).trunc() as i64
}

/// Rejects output axes that are empty or hold non-finite values.
pub(crate) fn validate_axis(name: &str, axis: &[f64]) -> Result<()> {
    if axis.is_empty() {
        return Err(CalibrationError::InvalidAxisInput(format!(
            "{name} axis is empty"
        )));
    }
    if let Some(index) = axis.iter().position(|value| !value.is_finite()) {
        return Err(CalibrationError::InvalidAxisInput(format!(
            "{name} axis value at index {index} is not a finite number"
        )));
    }
    Ok(())
}

/// Chains the pressure and duration maps into SOI values.
///
/// The pressure map is indexed by (engine speed, fuel quantity) and the
/// duration map by (rail pressure, fuel quantity).
#[derive(Debug)]
pub struct SoiDeriver<'a> {
    pressure: GridInterpolator<'a>,
    duration: GridInterpolator<'a>,
}

impl<'a> SoiDeriver<'a> {
    pub fn new(pressure_table: &'a CalibrationTable, duration_table: &'a CalibrationTable) -> Result<Self> {
        Ok(Self {
            pressure: GridInterpolator::build(pressure_table)?,
            duration: GridInterpolator::build(duration_table)?,
        })
    }

    /// SOI for a single (speed, fuel) operating point.
    pub fn evaluate_point(&self, speed: f64, fuel: f64) -> i64 {
        let pressure = self.pressure.evaluate(speed, fuel);
        let duration = self.duration.evaluate(pressure, fuel);
        soi_value(speed, duration)
    }

    fn derive_row(&self, speed: f64, fuel_axis: &[f64]) -> Vec<i64> {
        fuel_axis
            .iter()
            .map(|&fuel| self.evaluate_point(speed, fuel))
            .collect()
    }

    /// Computes the SOI table over `speed_axis × fuel_axis`, rows following
    /// `speed_axis` and columns following `fuel_axis` in the given order.
    pub fn derive_grid(&self, speed_axis: &[f64], fuel_axis: &[f64]) -> Result<DerivedTable> {
        validate_axis("speed", speed_axis)?;
        validate_axis("fuel", fuel_axis)?;

        debug!(
            "Deriving SOI table: {}x{}",
            speed_axis.len(),
            fuel_axis.len()
        );

        #[cfg(feature = "parallel")]
        let cells: Vec<Vec<i64>> = speed_axis
            .par_iter()
            .map(|&speed| self.derive_row(speed, fuel_axis))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let cells: Vec<Vec<i64>> = speed_axis
            .iter()
            .map(|&speed| self.derive_row(speed, fuel_axis))
            .collect();

        Ok(DerivedTable {
            speed_axis: speed_axis.to_vec(),
            fuel_axis: fuel_axis.to_vec(),
            cells,
        })
    }

    /// Builds both interpolators and derives the SOI table in one call.
    ///
    /// Fails as a whole: no partial table is returned.
    pub fn derive(
        pressure_table: &CalibrationTable,
        duration_table: &CalibrationTable,
        speed_axis: &[f64],
        fuel_axis: &[f64],
    ) -> Result<DerivedTable> {
        SoiDeriver::new(pressure_table, duration_table)?.derive_grid(speed_axis, fuel_axis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant_table(value: u16) -> CalibrationTable {
        CalibrationTable::from_parts(vec![0], vec![0], vec![value]).unwrap()
    }

    #[test]
    fn test_soi_formula_halves_speed_and_truncates() {
        // 500 * 5000 / 166666.67 = 14.9999997, / 0.023438 = 639.98...
        assert_eq!(soi_value(1000.0, 5000.0), 639);
        assert_eq!(soi_value(0.0, 5000.0), 0);
        assert_eq!(soi_value(3000.0, 0.0), 0);
    }

    #[test]
    fn test_single_cell_derivation_matches_formula() {
        let pressure = constant_table(800);
        let duration = constant_table(5000);

        let derived = SoiDeriver::derive(&pressure, &duration, &[1000.0], &[10.0]).unwrap();

        assert_eq!(derived.speed_axis, vec![1000.0]);
        assert_eq!(derived.fuel_axis, vec![10.0]);
        assert_eq!(derived.cells, vec![vec![639]]);
    }

    #[test]
    fn test_output_shape_follows_axis_order() {
        let pressure = CalibrationTable::from_parts(
            vec![1000, 3000],
            vec![0, 40],
            vec![300, 600, 900, 1500],
        )
        .unwrap();
        let duration = CalibrationTable::from_parts(
            vec![300, 1500],
            vec![0, 40],
            vec![200, 900, 100, 500],
        )
        .unwrap();

        let speeds = [4000.0, 1000.0, 2500.0];
        let fuels = [40.0, 0.0];
        let derived = SoiDeriver::derive(&pressure, &duration, &speeds, &fuels).unwrap();

        assert_eq!(derived.rows(), 3);
        assert_eq!(derived.cols(), 2);
        assert_eq!(derived.speed_axis, speeds.to_vec());
        assert_eq!(derived.fuel_axis, fuels.to_vec());

        let deriver = SoiDeriver::new(&pressure, &duration).unwrap();
        for (i, &speed) in speeds.iter().enumerate() {
            for (j, &fuel) in fuels.iter().enumerate() {
                assert_eq!(derived.cells[i][j], deriver.evaluate_point(speed, fuel));
            }
        }
    }

    #[test]
    fn test_pressure_feeds_duration_lookup() {
        // Speed 2000 at fuel 0 interpolates pressure to 600, which lands
        // halfway along the duration map's pressure axis.
        let pressure =
            CalibrationTable::from_parts(vec![1000, 3000], vec![0], vec![300, 900]).unwrap();
        let duration =
            CalibrationTable::from_parts(vec![300, 900], vec![0], vec![1000, 3000]).unwrap();
        let deriver = SoiDeriver::new(&pressure, &duration).unwrap();

        assert_eq!(deriver.evaluate_point(2000.0, 0.0), soi_value(2000.0, 2000.0));
    }

    #[test]
    fn test_empty_output_axis_is_rejected() {
        let table = constant_table(1);

        let result = SoiDeriver::derive(&table, &table, &[], &[1.0]);

        assert!(matches!(
            result.unwrap_err(),
            CalibrationError::InvalidAxisInput(_)
        ));
    }

    #[test]
    fn test_non_finite_output_axis_is_rejected() {
        let table = constant_table(1);

        let result = SoiDeriver::derive(&table, &table, &[1000.0], &[1.0, f64::NAN]);

        assert!(matches!(
            result.unwrap_err(),
            CalibrationError::InvalidAxisInput(_)
        ));
    }

    #[test]
    fn test_new_rejects_non_monotonic_duration_map() {
        let pressure = constant_table(1);
        let duration =
            CalibrationTable::from_parts(vec![900, 300], vec![0], vec![1, 2]).unwrap();

        let error = SoiDeriver::new(&pressure, &duration).unwrap_err();

        assert!(matches!(
            error,
            CalibrationError::NonMonotonicAxis { axis: "row", index: 1 }
        ));
    }

    #[test]
    fn test_degenerate_source_map_fails_whole_derivation() {
        let good = constant_table(1);
        let empty = CalibrationTable::from_parts(vec![], vec![], vec![]).unwrap();

        let result = SoiDeriver::derive(&good, &empty, &[1000.0], &[1.0]);

        assert!(matches!(
            result.unwrap_err(),
            CalibrationError::DegenerateAxis(_)
        ));
    }
}
