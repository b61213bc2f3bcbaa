//! Normalized loudness metrics.
//!
//! RMS and peak levels are converted to dBFS and mapped onto a 0..100
//! scale where 0 is the -120 dBFS floor and 100 is full scale.

use serde::{Deserialize, Serialize};

/// Silence floor in dBFS.
const DB_FLOOR: f32 = -120.0;

/// Guard against `log10(0)`.
const MIN_LEVEL: f32 = 1e-12;

/// Per-frame loudness, both values normalized to `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoudnessMetrics {
    /// RMS energy of the frame.
    pub rms: f32,
    /// Peak absolute sample of the frame.
    pub peak: f32,
}

/// Map a dBFS level onto the 0..100 scale.
fn normalize_dbfs(db: f32) -> f32 {
    ((120.0 + db) * (100.0 / 120.0)).clamp(0.0, 100.0)
}

/// Compute normalized RMS and peak loudness for one frame.
///
/// An empty frame yields zero for both metrics.
pub fn analyze(frame: &[f32]) -> LoudnessMetrics {
    if frame.is_empty() {
        return LoudnessMetrics::default();
    }

    let mut sum_sq = 0.0f64;
    let mut peak = 0.0f32;
    for &sample in frame {
        sum_sq += (sample as f64) * (sample as f64);
        peak = peak.max(sample.abs());
    }

    let rms = (sum_sq / frame.len() as f64).sqrt() as f32;
    let rms_db = 20.0 * rms.max(MIN_LEVEL).log10();
    let peak_db = (20.0 * peak.max(MIN_LEVEL).log10()).max(DB_FLOOR);

    LoudnessMetrics {
        rms: normalize_dbfs(rms_db),
        peak: normalize_dbfs(peak_db),
    }
}
