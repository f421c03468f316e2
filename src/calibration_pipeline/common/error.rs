use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalibrationError {
    #[error("Map read out of bounds: word index {index} but buffer holds {len} words")]
    DecodeOutOfBounds { index: usize, len: usize },

    #[error("Short row {row}: expected {expected} words, only {available} available")]
    ShortRow {
        row: usize,
        expected: usize,
        available: usize,
    },

    #[error("Degenerate axis: {0} axis has no values")]
    DegenerateAxis(&'static str),

    #[error("Non-monotonic axis: {axis} axis is not strictly increasing at index {index}")]
    NonMonotonicAxis { axis: &'static str, index: usize },

    #[error("Invalid axis input: {0}")]
    InvalidAxisInput(String),

    #[error("Invalid table dimensions: rows={0}, cols={1}")]
    InvalidDimensions(usize, usize),

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to encode derived table: {0}")]
    EncodeError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CalibrationError>;
