pub mod calibration_pipeline;
pub mod logger;
