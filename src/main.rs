use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use soi_calibration_rs::calibration_pipeline::map::word_buffer::word_offset;
use soi_calibration_rs::calibration_pipeline::{
    soi_value, DerivationConfig, DerivationConfigBuilder, Endianness, FirmwareToSoiPipeline,
    LengthPrefixedMapReader, MapReader, OutputFormat, WordBuffer,
};
use soi_calibration_rs::logger;

use tracing::{error, info};

/// soi-derive – derive start-of-injection maps from ECU firmware images.
#[derive(Parser, Debug)]
#[command(name = "soi-derive", version)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Derive an SOI table from the pressure and duration maps of an image.
    Derive {
        /// Firmware image to read.
        image: PathBuf,
        /// TOML file with derivation settings; flags override its values.
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, value_enum)]
        endianness: Option<EndiannessOpt>,
        /// Byte offset of the pressure map (decimal or 0x-prefixed hex).
        #[arg(long, value_parser = parse_offset)]
        pressure_offset: Option<usize>,
        /// Byte offset of the duration map (decimal or 0x-prefixed hex).
        #[arg(long, value_parser = parse_offset)]
        duration_offset: Option<usize>,
        /// Engine speeds for the output rows, comma separated.
        #[arg(long, value_delimiter = ',')]
        speed: Vec<f64>,
        /// Fuel quantities for the output columns, comma separated.
        #[arg(long, value_delimiter = ',')]
        fuel: Vec<f64>,
        #[arg(long, value_enum)]
        format: Option<FormatOpt>,
        /// Write the table here instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Apply the SOI formula to a single speed and injection duration.
    Point { speed: f64, duration: f64 },
    /// Decode and print the map stored at a byte offset.
    Inspect {
        image: PathBuf,
        #[arg(long, value_parser = parse_offset)]
        offset: usize,
        #[arg(long, value_enum, default_value = "big")]
        endianness: EndiannessOpt,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EndiannessOpt {
    Big,
    Little,
}

impl From<EndiannessOpt> for Endianness {
    fn from(opt: EndiannessOpt) -> Self {
        match opt {
            EndiannessOpt::Big => Endianness::Big,
            EndiannessOpt::Little => Endianness::Little,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatOpt {
    Text,
    Csv,
    Json,
}

impl From<FormatOpt> for OutputFormat {
    fn from(opt: FormatOpt) -> Self {
        match opt {
            FormatOpt::Text => OutputFormat::Text,
            FormatOpt::Csv => OutputFormat::Csv,
            FormatOpt::Json => OutputFormat::Json,
        }
    }
}

fn parse_offset(text: &str) -> Result<usize, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|e| format!("invalid offset '{text}': {e}"))
}

#[allow(clippy::too_many_arguments)]
fn run_derive(
    image: PathBuf,
    config_path: Option<PathBuf>,
    endianness: Option<EndiannessOpt>,
    pressure_offset: Option<usize>,
    duration_offset: Option<usize>,
    speed: Vec<f64>,
    fuel: Vec<f64>,
    format: Option<FormatOpt>,
    output: Option<PathBuf>,
) -> Result<()> {
    let base = match &config_path {
        Some(path) => DerivationConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => DerivationConfig::default(),
    };

    let mut builder = DerivationConfigBuilder::from_config(base);
    if let Some(endianness) = endianness {
        builder = builder.endianness(endianness.into());
    }
    if let Some(offset) = pressure_offset {
        builder = builder.pressure_offset(offset);
    }
    if let Some(offset) = duration_offset {
        builder = builder.duration_offset(offset);
    }
    if !speed.is_empty() {
        builder = builder.speed_axis(speed);
    }
    if !fuel.is_empty() {
        builder = builder.fuel_axis(fuel);
    }
    if let Some(format) = format {
        builder = builder.output_format(format.into());
    }

    let pipeline = FirmwareToSoiPipeline::new(builder.build()).context("invalid derivation request")?;

    info!("Firmware to SOI pipeline initialized");
    info!("Endianness: {:?}", pipeline.config().endianness);
    info!(
        "Pressure map at {:#x}, duration map at {:#x}",
        pipeline.config().pressure_offset,
        pipeline.config().duration_offset
    );

    match output {
        Some(output) => pipeline.convert_file(&image, &output)?,
        None => {
            let data = std::fs::read(&image).with_context(|| format!("reading {}", image.display()))?;
            let stdout = std::io::stdout();
            pipeline.convert(&data, &mut stdout.lock())?;
        }
    }

    Ok(())
}

fn run_inspect(image: PathBuf, offset: usize, endianness: EndiannessOpt) -> Result<()> {
    let data = std::fs::read(&image).with_context(|| format!("reading {}", image.display()))?;
    let buffer = WordBuffer::from_bytes(&data, endianness.into());

    let (table, next) = LengthPrefixedMapReader
        .read_map(&buffer, word_offset(offset))
        .with_context(|| format!("decoding map at {offset:#x}"))?;

    println!("map at {:#x}: {}x{}", offset, table.rows(), table.cols());
    println!("row axis: {:?}", table.row_axis());
    println!("col axis: {:?}", table.col_axis());
    for row in 0..table.rows() {
        println!("{:>6}: {:?}", table.row_axis()[row], table.row(row));
    }
    println!("next map at {:#x}", next * 2);

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        logger::init_with_default("debug");
    } else {
        logger::init();
    }

    info!("Starting soi-derive...");

    let result = match cli.cmd {
        Cmd::Derive {
            image,
            config,
            endianness,
            pressure_offset,
            duration_offset,
            speed,
            fuel,
            format,
            output,
        } => run_derive(
            image,
            config,
            endianness,
            pressure_offset,
            duration_offset,
            speed,
            fuel,
            format,
            output,
        ),
        Cmd::Point { speed, duration } => {
            println!("{}", soi_value(speed, duration));
            Ok(())
        }
        Cmd::Inspect {
            image,
            offset,
            endianness,
        } => run_inspect(image, offset, endianness),
    };

    match &result {
        Ok(()) => info!("Done"),
        Err(e) => error!("soi-derive failed: {:#}", e),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_offset_accepts_decimal_and_hex() {
        assert_eq!(parse_offset("4096"), Ok(4096));
        assert_eq!(parse_offset("0x1000"), Ok(4096));
        assert_eq!(parse_offset("0X1a"), Ok(26));
        assert!(parse_offset("0xZZ").is_err());
        assert!(parse_offset("-1").is_err());
    }

    #[test]
    fn test_cli_parses_derive_flags() {
        let cli = Cli::try_parse_from([
            "soi-derive",
            "derive",
            "fw.bin",
            "--endianness",
            "little",
            "--pressure-offset",
            "0x40",
            "--speed",
            "1000,2000",
            "--fuel",
            "10",
            "--format",
            "json",
        ])
        .unwrap();

        match cli.cmd {
            Cmd::Derive { pressure_offset, speed, fuel, .. } => {
                assert_eq!(pressure_offset, Some(0x40));
                assert_eq!(speed, vec![1000.0, 2000.0]);
                assert_eq!(fuel, vec![10.0]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
