use tracing::{debug, info, instrument};
use std::io::Write;
use std::path::Path;

use crate::calibration_pipeline::{
    common::error::{CalibrationError, Result},
    map::{word_buffer::word_offset, CalibrationTable, LengthPrefixedMapReader, MapReader, WordBuffer},
    output::{DerivationConfig, StandardTableWriter, TableWriter},
    soi::{DerivedTable, SoiDeriver},
};

pub struct FirmwareToSoiPipeline<R: MapReader, W: TableWriter> {
    reader: R,
    writer: W,
    config: DerivationConfig,
}

impl FirmwareToSoiPipeline<LengthPrefixedMapReader, StandardTableWriter> {
    pub fn new(config: DerivationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            reader: LengthPrefixedMapReader,
            writer: StandardTableWriter,
            config,
        })
    }
}

impl<R: MapReader, W: TableWriter> FirmwareToSoiPipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: DerivationConfig) -> Self {
        Self {
            reader,
            writer,
            config,
        }
    }

    /// Decodes the pressure and duration maps from one shared word view of
    /// the image. The offsets are independent absolute byte addresses.
    pub fn read_maps(&self, input_data: &[u8]) -> Result<(CalibrationTable, CalibrationTable)> {
        let buffer = {
            let _span = tracing::info_span!("decode_words").entered();
            WordBuffer::from_bytes(input_data, self.config.endianness)
        };
        debug!("Decoded {} words ({:?})", buffer.len(), buffer.endianness());

        let (pressure, _) = {
            let _span = tracing::info_span!("extract_pressure_map",
                offset = self.config.pressure_offset
            ).entered();
            self.reader.read_map(&buffer, word_offset(self.config.pressure_offset))?
        };

        let (duration, _) = {
            let _span = tracing::info_span!("extract_duration_map",
                offset = self.config.duration_offset
            ).entered();
            self.reader.read_map(&buffer, word_offset(self.config.duration_offset))?
        };

        Ok((pressure, duration))
    }

    #[instrument(skip(self, input_data), fields(input_size = input_data.len()))]
    pub fn derive(&self, input_data: &[u8]) -> Result<DerivedTable> {
        info!("Starting firmware to SOI derivation");

        let (pressure, duration) = self.read_maps(input_data)?;

        let table = {
            let _span = tracing::info_span!("derive_soi",
                rows = self.config.speed_axis.len(),
                cols = self.config.fuel_axis.len()
            ).entered();
            SoiDeriver::derive(
                &pressure,
                &duration,
                &self.config.speed_axis,
                &self.config.fuel_axis,
            )?
        };

        info!(
            pressure_rows = pressure.rows(),
            pressure_cols = pressure.cols(),
            duration_rows = duration.rows(),
            duration_cols = duration.cols(),
            "Derivation complete"
        );
        Ok(table)
    }

    #[instrument(skip(self, input_data, output), fields(input_size = input_data.len()))]
    pub fn convert(&self, input_data: &[u8], output: &mut dyn Write) -> Result<DerivedTable> {
        let table = self.derive(input_data)?;

        {
            let _span = tracing::info_span!("write_table").entered();
            self.writer.write_table(&table, output, &self.config)?;
        }

        Ok(table)
    }

    #[instrument(skip(self, input_path, output_path))]
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<()> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting file"
        );

        let input_data = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read(input_path).map_err(|e| {
                CalibrationError::InputReadError(format!("{}: {}", input_path.display(), e))
            })?
        };

        // Output is only created once the derivation succeeded.
        let table = self.derive(&input_data)?;

        let mut output_file = {
            let _span = tracing::info_span!("create_output_file").entered();
            std::fs::File::create(output_path).map_err(|e| {
                CalibrationError::OutputWriteError(format!("{}: {}", output_path.display(), e))
            })?
        };

        {
            let _span = tracing::info_span!("write_table").entered();
            self.writer.write_table(&table, &mut output_file, &self.config)?;
        }

        Ok(())
    }

    pub fn config(&self) -> &DerivationConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: DerivationConfig) {
        self.config = config;
    }
}
