//! Detection configuration.
//!
//! One struct with named defaults, validated as a whole. Tolerance and
//! precision apply to subsequent frames immediately; sample rate, buffer
//! size, and overlap are capture parameters and take effect on the next
//! `start()`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Buffer sizes below this destabilize FFT_YIN-style estimators.
pub const MIN_BUFFER_SIZE: usize = 7056;

/// Floor applied when the configured buffer size is below [`MIN_BUFFER_SIZE`].
pub const SAFE_BUFFER_SIZE: usize = 8192;

/// Configuration for a [`DetectionSession`](crate::DetectionSession).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Capture sample rate in Hz.
    pub sample_rate: u32,
    /// Samples per analysis frame.
    pub buffer_size: usize,
    /// Overlap between consecutive capture frames, in samples.
    pub overlap: usize,
    /// Tuning tolerance window. The accepted deviation from the nearest
    /// semitone is `tolerance * 100` cents, so `1.0` spans a full semitone.
    pub tolerance: f64,
    /// Minimum estimator confidence (0.0 to 1.0) for a frame's pitch to be
    /// accepted into the note state.
    pub min_precision: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            buffer_size: SAFE_BUFFER_SIZE,
            overlap: 0,
            tolerance: 0.6,
            min_precision: 0.8,
        }
    }
}

impl DetectionConfig {
    /// Validate every field. Returns the first violation found.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::InvalidSampleRate(self.sample_rate));
        }
        if self.buffer_size == 0 {
            return Err(Error::InvalidBufferSize(self.buffer_size));
        }
        if self.tolerance <= 0.0 {
            return Err(Error::InvalidTolerance(self.tolerance));
        }
        validate_precision(self.min_precision)?;
        Ok(())
    }

    /// Capture-facing projection of this config.
    pub fn stream_params(&self) -> StreamParams {
        StreamParams {
            sample_rate: self.sample_rate,
            buffer_size: self.buffer_size,
            overlap: self.overlap,
        }
    }
}

/// Check that a precision value lies in `[0, 1]`.
pub(crate) fn validate_precision(value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidPrecision(value))
    }
}

/// Parameters handed to the audio capture collaborator on `start()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamParams {
    pub sample_rate: u32,
    pub buffer_size: usize,
    pub overlap: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(DetectionConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_precision() {
        let mut config = DetectionConfig {
            min_precision: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidPrecision(p)) if p == 1.5
        ));

        config.min_precision = -0.1;
        assert!(config.validate().is_err());

        config.min_precision = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_tolerance() {
        let config = DetectionConfig {
            tolerance: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidTolerance(_))));
    }

    #[test]
    fn stream_params_projection() {
        let config = DetectionConfig::default();
        let params = config.stream_params();
        assert_eq!(params.sample_rate, 44_100);
        assert_eq!(params.buffer_size, SAFE_BUFFER_SIZE);
        assert_eq!(params.overlap, 0);
    }
}
