use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the scoring pipeline.
#[derive(Error, Debug)]
pub enum AstrometerError {
    #[error("No calibration data for meter '{meter}' and no global fallback. Re-run calibration before scoring.")]
    MissingCalibration { meter: String },
    #[error("Invalid calibration for '{meter}': {message}")]
    InvalidCalibration { meter: String, message: String },
    #[error("Failed to read calibration file {path}: {source}")]
    CalibrationIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse calibration data: {0}")]
    CalibrationParse(#[from] serde_json::Error),
    #[error("Unknown aspect type: {0}")]
    UnknownAspectType(String),
    #[error("Unknown meter: {0}")]
    UnknownMeter(String),
    #[error("Invalid chart: {0}")]
    InvalidChart(String),
}

pub type Result<T> = std::result::Result<T, AstrometerError>;
