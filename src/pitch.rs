//! Pitch estimate input and derived note state.

use crate::loudness::LoudnessMetrics;
use crate::note;
use serde::{Deserialize, Serialize};

/// One estimator reading for a single audio frame.
///
/// Produced by an external pitch estimator (YIN, MPM, ...); the engine
/// treats it as opaque input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PitchEstimate {
    /// Estimated fundamental frequency in Hz; `0.0` means unvoiced.
    pub frequency: f32,
    /// Estimator confidence in `[0, 1]`.
    pub confidence: f32,
}

impl PitchEstimate {
    pub fn new(frequency: f32, confidence: f32) -> Self {
        Self {
            frequency,
            confidence,
        }
    }

    /// An estimate carrying no pitch.
    pub fn unvoiced() -> Self {
        Self::default()
    }

    /// Whether the estimator reported a pitch at all.
    pub fn is_voiced(&self) -> bool {
        self.frequency > 0.0
    }
}

/// Musical state derived from the most recent accepted estimate.
///
/// Replaced wholesale on every ingested frame. No note means no pitch;
/// there is no integer sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteState {
    /// Detected frequency in Hz, `0.0` when no pitch.
    pub frequency: f32,
    /// Nearest MIDI note, `None` when no pitch.
    pub midi_note: Option<u8>,
}

impl NoteState {
    /// Derive note state from an accepted frequency. Clears to "no pitch"
    /// when the frequency does not map into MIDI range.
    pub fn from_frequency(frequency: f32) -> Self {
        match note::frequency_to_midi(frequency as f64) {
            Some(midi_note) => Self {
                frequency,
                midi_note: Some(midi_note),
            },
            None => Self::default(),
        }
    }

    pub fn has_pitch(&self) -> bool {
        self.midi_note.is_some()
    }
}

/// The unit of consistency published after each ingested frame.
///
/// Readers always observe one frame's note, loudness, and confidence
/// together, never a mix of frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub note: NoteState,
    pub loudness: LoudnessMetrics,
    /// Confidence of the estimate this snapshot was derived from.
    pub confidence: f32,
}
