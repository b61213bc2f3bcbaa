//! # pitchlab
//!
//! Live pitch and loudness analysis for tuner-style applications.
//!
//! An external capture + estimator pipeline pushes one
//! `(frame, estimate)` pair per audio frame into a [`DetectionSession`];
//! the session derives:
//!
//! - **Note state**: nearest MIDI note, note name, octave (`"A4"`)
//! - **Tuning accuracy**: 0-100 score and an on-pitch predicate, scaled
//!   by a tolerance window in cents
//! - **Loudness**: RMS and peak levels normalized to 0-100 from dBFS
//! - **Sample history**: the last second of raw samples, also as 16-bit
//!   little-endian PCM
//!
//! Queries read a lock-free published snapshot and are safe from any
//! thread while ingestion runs. Pitch estimation itself (YIN, MPM, ...)
//! is a pluggable collaborator, not part of this crate.
//!
//! ## Example
//!
//! ```rust
//! use pitchlab::{DetectionSession, PitchEstimate};
//!
//! let session = DetectionSession::new();
//! session.start()?;
//!
//! // Per frame, the capture pipeline delivers samples plus an estimate:
//! let frame = vec![0.1f32; 8192];
//! session.ingest(&frame, PitchEstimate::new(440.0, 0.93));
//!
//! assert_eq!(session.note_octave(), "A4");
//! assert_eq!(session.accuracy(1.0), 100);
//! session.stop();
//! # Ok::<(), pitchlab::Error>(())
//! ```

pub mod capture;
pub mod config;
pub mod history;
pub mod loudness;
pub mod note;
pub mod pitch;
pub mod session;
pub mod tolerance;

mod error;

pub use capture::{AudioCapture, NullCapture};
pub use config::{DetectionConfig, StreamParams, MIN_BUFFER_SIZE, SAFE_BUFFER_SIZE};
pub use error::{Error, Result};
pub use history::SampleHistory;
pub use loudness::LoudnessMetrics;
pub use pitch::{AnalysisSnapshot, NoteState, PitchEstimate};
pub use session::DetectionSession;
