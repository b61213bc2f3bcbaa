//! Error types for pitchlab.

use thiserror::Error;

/// Error type for detection session operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid precision: {0}. Must be between 0.0 and 1.0")]
    InvalidPrecision(f64),

    #[error("Invalid tolerance: {0}. Must be positive")]
    InvalidTolerance(f64),

    #[error("Invalid sample rate: {0}. Must be positive")]
    InvalidSampleRate(u32),

    #[error("Invalid buffer size: {0}. Must be positive")]
    InvalidBufferSize(usize),

    #[error("Audio capture failed to start: {0}")]
    StartFailed(String),

    #[error("Detection session is not running")]
    NotRunning,
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;
