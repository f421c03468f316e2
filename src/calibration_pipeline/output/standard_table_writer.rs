use std::io::Write;
use tracing::debug;
use crate::calibration_pipeline::common::error::{CalibrationError, Result};
use crate::calibration_pipeline::output::types::{DerivationConfig, OutputFormat};
use crate::calibration_pipeline::output::writer::TableWriter;
use crate::calibration_pipeline::soi::types::DerivedTable;

/// Label of the corner cell shared by the speed column and the fuel header row.
const CORNER_LABEL: &str = "speed\\fuel";

pub struct StandardTableWriter;

impl StandardTableWriter {
    fn write_text(table: &DerivedTable, output: &mut dyn Write) -> Result<()> {
        let header: Vec<String> = std::iter::once(CORNER_LABEL.to_string())
            .chain(table.fuel_axis.iter().map(|fuel| fuel.to_string()))
            .collect();
        let rows: Vec<Vec<String>> = table
            .speed_axis
            .iter()
            .zip(&table.cells)
            .map(|(speed, cells)| {
                std::iter::once(speed.to_string())
                    .chain(cells.iter().map(|soi| soi.to_string()))
                    .collect()
            })
            .collect();

        let width = std::iter::once(&header)
            .chain(&rows)
            .flatten()
            .map(String::len)
            .max()
            .unwrap_or(0);

        for line in std::iter::once(&header).chain(&rows) {
            let rendered: Vec<String> = line.iter().map(|cell| format!("{cell:>width$}")).collect();
            writeln!(output, "{}", rendered.join(" "))?;
        }
        Ok(())
    }

    fn write_csv(table: &DerivedTable, output: &mut dyn Write) -> Result<()> {
        let mut writer = csv::Writer::from_writer(output);

        let header = std::iter::once(CORNER_LABEL.to_string())
            .chain(table.fuel_axis.iter().map(|fuel| fuel.to_string()));
        writer
            .write_record(header)
            .map_err(|e| CalibrationError::EncodeError(e.to_string()))?;

        for (speed, cells) in table.speed_axis.iter().zip(&table.cells) {
            let record = std::iter::once(speed.to_string())
                .chain(cells.iter().map(|soi| soi.to_string()));
            writer
                .write_record(record)
                .map_err(|e| CalibrationError::EncodeError(e.to_string()))?;
        }

        writer.flush()?;
        Ok(())
    }

    fn write_json(table: &DerivedTable, output: &mut dyn Write) -> Result<()> {
        serde_json::to_writer_pretty(&mut *output, table)
            .map_err(|e| CalibrationError::EncodeError(e.to_string()))?;
        writeln!(output)?;
        Ok(())
    }
}

impl TableWriter for StandardTableWriter {
    fn write_table(&self, table: &DerivedTable, output: &mut dyn Write, config: &DerivationConfig) -> Result<()> {
        debug!(
            "Writing {}x{} SOI table as {:?}",
            table.rows(),
            table.cols(),
            config.output_format
        );

        match config.output_format {
            OutputFormat::Text => Self::write_text(table, output),
            OutputFormat::Csv => Self::write_csv(table, output),
            OutputFormat::Json => Self::write_json(table, output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> DerivedTable {
        DerivedTable {
            speed_axis: vec![1000.0, 2500.0],
            fuel_axis: vec![10.0, 12.5],
            cells: vec![vec![639, 7], vec![-3, 1200]],
        }
    }

    fn render(format: OutputFormat) -> String {
        let config = DerivationConfig::builder().output_format(format).build();
        let mut buffer = Vec::new();
        StandardTableWriter
            .write_table(&sample_table(), &mut buffer, &config)
            .unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_csv_output() {
        assert_eq!(
            render(OutputFormat::Csv),
            "speed\\fuel,10,12.5\n1000,639,7\n2500,-3,1200\n"
        );
    }

    #[test]
    fn test_json_output_round_trips() {
        let text = render(OutputFormat::Json);
        let parsed: DerivedTable = serde_json::from_str(&text).unwrap();

        assert_eq!(parsed, sample_table());
    }

    #[test]
    fn test_text_output_is_aligned() {
        let text = render(OutputFormat::Text);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "speed\\fuel         10       12.5");
        assert_eq!(lines[1], "      1000        639          7");
        assert_eq!(lines[2], "      2500         -3       1200");
    }
}
