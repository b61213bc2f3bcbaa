//! Tuning accuracy scoring.
//!
//! Distance from the nearest semitone is measured in cents (1/100 of a
//! semitone). The accepted window is `tolerance * 100` cents; accuracy
//! scales linearly from 100 at the target down to 0 at the window edge.

use crate::note::midi_to_frequency;

/// Absolute deviation of `frequency` from MIDI `note`, in cents.
pub fn cents_deviation(frequency: f64, note: u8) -> f64 {
    (1200.0 * (frequency / midi_to_frequency(note)).log2()).abs()
}

/// Accuracy score in `[0, 100]` for a detected frequency against its
/// nearest note.
///
/// Zero when there is no current pitch, the frequency is non-positive,
/// the tolerance window is empty, or the deviation reaches the window
/// edge. Non-positive tolerance never divides by zero.
pub fn accuracy(frequency: f64, note: Option<u8>, tolerance: f64) -> u8 {
    let Some(note) = note else { return 0 };
    if frequency <= 0.0 {
        return 0;
    }
    let max_cents = tolerance * 100.0;
    if max_cents <= 0.0 {
        return 0;
    }
    let deviation = cents_deviation(frequency, note);
    if deviation >= max_cents {
        return 0;
    }
    (100.0 * (1.0 - deviation / max_cents)).round().clamp(0.0, 100.0) as u8
}

/// Whether the detected frequency is close enough to its nearest note:
/// the remaining headroom `1 - deviation/max_cents` must reach
/// `min_precision`. False whenever there is no current pitch or the
/// tolerance window is empty.
pub fn is_on_pitch(frequency: f64, note: Option<u8>, tolerance: f64, min_precision: f64) -> bool {
    let Some(note) = note else { return false };
    if frequency <= 0.0 {
        return false;
    }
    let max_cents = tolerance * 100.0;
    if max_cents <= 0.0 {
        return false;
    }
    1.0 - cents_deviation(frequency, note) / max_cents >= min_precision
}
