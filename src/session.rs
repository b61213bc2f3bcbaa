//! Detection session: lifecycle, frame ingestion, and queries.
//!
//! One producer (the capture/estimator pipeline) calls [`DetectionSession::ingest`]
//! per frame; any number of readers query concurrently. The derived
//! pitch/loudness state is published whole via `ArcSwap`, so reads are
//! lock-free and never observe a torn frame. The sample history and the
//! configuration sit behind their own locks; lifecycle transitions
//! serialize on the capture handle.

use crate::capture::{AudioCapture, NullCapture};
use crate::config::{validate_precision, DetectionConfig, MIN_BUFFER_SIZE, SAFE_BUFFER_SIZE};
use crate::error::{Error, Result};
use crate::history::SampleHistory;
use crate::loudness;
use crate::note;
use crate::pitch::{AnalysisSnapshot, NoteState, PitchEstimate};
use crate::tolerance;
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct Lifecycle {
    capture: Box<dyn AudioCapture>,
    running: bool,
}

/// A restartable pitch/loudness detection session.
///
/// Starts Idle. [`start`](Self::start) signals the capture collaborator
/// and begins accepting frames; [`stop`](Self::stop) returns to Idle.
/// Queries are valid in either state and report "no pitch" sentinels
/// while Idle.
pub struct DetectionSession {
    config: Mutex<DetectionConfig>,
    lifecycle: Mutex<Lifecycle>,
    /// Mirror of `Lifecycle::running` for the lock-free ingest gate.
    running: AtomicBool,
    snapshot: ArcSwap<AnalysisSnapshot>,
    history: Mutex<SampleHistory>,
}

impl Default for DetectionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionSession {
    /// Create a session with default configuration and no capture device.
    pub fn new() -> Self {
        let config = DetectionConfig::default();
        let capacity = config.sample_rate as usize;
        Self {
            config: Mutex::new(config),
            lifecycle: Mutex::new(Lifecycle {
                capture: Box::new(NullCapture),
                running: false,
            }),
            running: AtomicBool::new(false),
            snapshot: ArcSwap::from_pointee(AnalysisSnapshot::default()),
            history: Mutex::new(SampleHistory::with_capacity(capacity)),
        }
    }

    /// Create a session driving the given capture collaborator.
    ///
    /// The configuration is validated as a whole.
    pub fn with_capture(
        config: DetectionConfig,
        capture: Box<dyn AudioCapture>,
    ) -> Result<Self> {
        config.validate()?;
        let capacity = config.sample_rate as usize;
        Ok(Self {
            config: Mutex::new(config),
            lifecycle: Mutex::new(Lifecycle {
                capture,
                running: false,
            }),
            running: AtomicBool::new(false),
            snapshot: ArcSwap::from_pointee(AnalysisSnapshot::default()),
            history: Mutex::new(SampleHistory::with_capacity(capacity)),
        })
    }

    // --- lifecycle ---

    /// Transition to Running and signal the capture collaborator.
    ///
    /// No-op when already running. Nothing persists across starts: the
    /// note state, loudness, and sample history all reset. A buffer size
    /// below the estimator-stability floor is raised before the capture
    /// parameters are handed out. On capture failure the session stays
    /// Idle and the error surfaces.
    pub fn start(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.running {
            return Ok(());
        }

        let params = {
            let mut config = self.config.lock();
            if config.buffer_size < MIN_BUFFER_SIZE {
                tracing::warn!(
                    requested = config.buffer_size,
                    raised_to = SAFE_BUFFER_SIZE,
                    "buffer size below stability floor, raising"
                );
                config.buffer_size = SAFE_BUFFER_SIZE;
            }
            config.stream_params()
        };

        self.snapshot.store(Arc::new(AnalysisSnapshot::default()));
        self.history
            .lock()
            .reset(params.sample_rate as usize);

        lifecycle.capture.start(params)?;

        lifecycle.running = true;
        self.running.store(true, Ordering::Release);
        tracing::info!(
            sample_rate = params.sample_rate,
            buffer_size = params.buffer_size,
            overlap = params.overlap,
            "detection started"
        );
        Ok(())
    }

    /// Signal the capture collaborator to stop and return to Idle.
    ///
    /// Idempotent and safe to call while a frame is mid-ingest; the
    /// in-flight snapshot update is atomic, so it lands whole or not at
    /// all.
    pub fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock();
        if !lifecycle.running {
            return;
        }
        self.running.store(false, Ordering::Release);
        lifecycle.capture.stop();
        lifecycle.running = false;
        tracing::info!("detection stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    // --- ingestion ---

    /// Process one audio frame and its estimator reading.
    ///
    /// Called by the capture pipeline, in arrival order, from a single
    /// producer context. Silently ignored while Idle. The estimate is
    /// accepted only when it is voiced and at least as confident as the
    /// configured minimum precision; otherwise the note state clears
    /// rather than holding a stale note.
    pub fn ingest(&self, frame: &[f32], estimate: PitchEstimate) {
        if !self.is_running() {
            return;
        }

        let min_precision = self.config.lock().min_precision;

        let note = if estimate.is_voiced() && estimate.confidence as f64 >= min_precision {
            NoteState::from_frequency(estimate.frequency)
        } else {
            NoteState::default()
        };

        self.snapshot.store(Arc::new(AnalysisSnapshot {
            note,
            loudness: loudness::analyze(frame),
            confidence: estimate.confidence,
        }));

        self.history.lock().extend(frame);
    }

    // --- queries ---

    /// Full consistent snapshot of the latest ingested frame.
    pub fn snapshot(&self) -> AnalysisSnapshot {
        *self.snapshot.load_full()
    }

    /// Detected frequency in Hz, `0.0` when no pitch.
    pub fn frequency(&self) -> f32 {
        self.snapshot.load().note.frequency
    }

    /// Confidence of the latest estimate.
    pub fn confidence(&self) -> f32 {
        self.snapshot.load().confidence
    }

    /// Nearest MIDI note, `None` when no pitch.
    pub fn midi_note(&self) -> Option<u8> {
        self.snapshot.load().note.midi_note
    }

    /// Note name such as `"A"`, empty when no pitch.
    pub fn note_name(&self) -> String {
        self.midi_note()
            .and_then(note::note_name)
            .unwrap_or_default()
            .to_string()
    }

    /// Octave number, `None` when no pitch.
    pub fn octave(&self) -> Option<i32> {
        self.midi_note().map(note::octave)
    }

    /// Note plus octave such as `"A4"`, empty when no pitch.
    pub fn note_octave(&self) -> String {
        note::format_note_octave(self.midi_note())
    }

    /// Accuracy score in `[0, 100]` against the given tolerance window.
    pub fn accuracy(&self, tolerance: f64) -> u8 {
        let snapshot = self.snapshot.load();
        tolerance::accuracy(
            snapshot.note.frequency as f64,
            snapshot.note.midi_note,
            tolerance,
        )
    }

    /// Whether the current pitch sits inside the tolerance window with at
    /// least `min_precision` headroom.
    pub fn is_on_pitch(&self, tolerance: f64, min_precision: f64) -> bool {
        let snapshot = self.snapshot.load();
        tolerance::is_on_pitch(
            snapshot.note.frequency as f64,
            snapshot.note.midi_note,
            tolerance,
            min_precision,
        )
    }

    /// RMS loudness of the latest frame, normalized to `[0, 100]`.
    pub fn volume(&self) -> f32 {
        self.snapshot.load().loudness.rms
    }

    /// Peak loudness of the latest frame, normalized to `[0, 100]`.
    pub fn peak_volume(&self) -> f32 {
        self.snapshot.load().loudness.peak
    }

    /// Copy of the retained raw samples (up to one second), oldest first.
    pub fn raw_samples(&self) -> Vec<f32> {
        self.history.lock().snapshot_raw()
    }

    /// Copy of the retained samples as 16-bit little-endian PCM bytes.
    pub fn pcm_samples(&self) -> Vec<u8> {
        self.history.lock().snapshot_pcm()
    }

    // --- configuration ---

    /// Current configuration.
    pub fn config(&self) -> DetectionConfig {
        *self.config.lock()
    }

    /// Replace the main parameters in one validated step.
    ///
    /// All-or-nothing: on any violation the previous configuration is
    /// kept untouched. Sample rate and buffer size take effect on the
    /// next [`start`](Self::start).
    pub fn set_parameters(
        &self,
        sample_rate: u32,
        buffer_size: usize,
        tolerance: f64,
        min_precision: f64,
    ) -> Result<()> {
        let mut config = self.config.lock();
        let candidate = DetectionConfig {
            sample_rate,
            buffer_size,
            tolerance,
            min_precision,
            ..*config
        };
        candidate.validate()?;
        *config = candidate;
        tracing::info!(
            sample_rate,
            buffer_size,
            tolerance,
            min_precision,
            "parameters updated"
        );
        Ok(())
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.lock().sample_rate
    }

    /// Takes effect on the next `start()`.
    pub fn set_sample_rate(&self, sample_rate: u32) -> Result<()> {
        if sample_rate == 0 {
            return Err(Error::InvalidSampleRate(sample_rate));
        }
        self.config.lock().sample_rate = sample_rate;
        Ok(())
    }

    pub fn buffer_size(&self) -> usize {
        self.config.lock().buffer_size
    }

    /// Takes effect on the next `start()`.
    pub fn set_buffer_size(&self, buffer_size: usize) -> Result<()> {
        if buffer_size == 0 {
            return Err(Error::InvalidBufferSize(buffer_size));
        }
        self.config.lock().buffer_size = buffer_size;
        Ok(())
    }

    pub fn overlap(&self) -> usize {
        self.config.lock().overlap
    }

    /// Takes effect on the next `start()`.
    pub fn set_overlap(&self, overlap: usize) {
        self.config.lock().overlap = overlap;
    }

    pub fn tolerance(&self) -> f64 {
        self.config.lock().tolerance
    }

    /// Applies to subsequent queries immediately.
    pub fn set_tolerance(&self, tolerance: f64) -> Result<()> {
        if tolerance <= 0.0 {
            return Err(Error::InvalidTolerance(tolerance));
        }
        self.config.lock().tolerance = tolerance;
        Ok(())
    }

    pub fn min_precision(&self) -> f64 {
        self.config.lock().min_precision
    }

    /// Applies to subsequent frames immediately. Values outside `[0, 1]`
    /// are rejected and the previous value is kept.
    pub fn set_min_precision(&self, min_precision: f64) -> Result<()> {
        validate_precision(min_precision)?;
        self.config.lock().min_precision = min_precision;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StreamParams;
    use std::sync::atomic::AtomicUsize;

    /// Capture stub counting start/stop signals.
    #[derive(Default)]
    struct CountingCapture {
        starts: Arc<AtomicUsize>,
        stops: Arc<AtomicUsize>,
        last_params: Arc<Mutex<Option<StreamParams>>>,
    }

    impl AudioCapture for CountingCapture {
        fn start(&mut self, params: StreamParams) -> Result<()> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            *self.last_params.lock() = Some(params);
            Ok(())
        }

        fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FailingCapture;

    impl AudioCapture for FailingCapture {
        fn start(&mut self, _params: StreamParams) -> Result<()> {
            Err(Error::StartFailed("device unavailable".into()))
        }

        fn stop(&mut self) {}
    }

    fn session_with_counting() -> (DetectionSession, Arc<AtomicUsize>, Arc<Mutex<Option<StreamParams>>>) {
        let capture = CountingCapture::default();
        let starts = capture.starts.clone();
        let params = capture.last_params.clone();
        let session =
            DetectionSession::with_capture(DetectionConfig::default(), Box::new(capture)).unwrap();
        (session, starts, params)
    }

    #[test]
    fn double_start_signals_capture_once() {
        let (session, starts, _) = session_with_counting();
        session.start().unwrap();
        session.start().unwrap();
        assert!(session.is_running());
        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stop_is_idempotent() {
        let (session, _, _) = session_with_counting();
        session.stop();
        assert!(!session.is_running());
        session.start().unwrap();
        session.stop();
        session.stop();
        assert!(!session.is_running());
    }

    #[test]
    fn small_buffer_size_is_raised_on_start() {
        let (session, _, params) = session_with_counting();
        session.set_buffer_size(1024).unwrap();
        session.start().unwrap();
        assert_eq!(params.lock().unwrap().buffer_size, SAFE_BUFFER_SIZE);
        assert_eq!(session.buffer_size(), SAFE_BUFFER_SIZE);
    }

    #[test]
    fn buffer_size_at_floor_is_kept() {
        let (session, _, params) = session_with_counting();
        session.set_buffer_size(MIN_BUFFER_SIZE).unwrap();
        session.start().unwrap();
        assert_eq!(params.lock().unwrap().buffer_size, MIN_BUFFER_SIZE);
    }

    #[test]
    fn failed_capture_leaves_session_idle() {
        let session =
            DetectionSession::with_capture(DetectionConfig::default(), Box::new(FailingCapture))
                .unwrap();
        assert!(matches!(session.start(), Err(Error::StartFailed(_))));
        assert!(!session.is_running());
    }

    #[test]
    fn ingest_while_idle_is_ignored() {
        let (session, _, _) = session_with_counting();
        session.ingest(&[0.5; 64], PitchEstimate::new(440.0, 0.95));
        assert_eq!(session.frequency(), 0.0);
        assert_eq!(session.volume(), 0.0);
        assert!(session.raw_samples().is_empty());
    }

    #[test]
    fn confident_estimate_updates_note_state() {
        let (session, _, _) = session_with_counting();
        session.start().unwrap();
        session.ingest(&[0.5; 64], PitchEstimate::new(440.0, 0.95));

        assert_eq!(session.midi_note(), Some(69));
        assert_eq!(session.note_name(), "A");
        assert_eq!(session.octave(), Some(4));
        assert_eq!(session.note_octave(), "A4");
        assert_eq!(session.frequency(), 440.0);
        assert_eq!(session.accuracy(1.0), 100);
        assert!(session.is_on_pitch(1.0, 0.8));
        assert!(session.volume() > 0.0);
    }

    #[test]
    fn low_confidence_clears_previous_note() {
        let (session, _, _) = session_with_counting();
        session.start().unwrap();
        session.ingest(&[0.5; 64], PitchEstimate::new(440.0, 0.95));
        assert_eq!(session.midi_note(), Some(69));

        session.ingest(&[0.5; 64], PitchEstimate::new(440.0, 0.3));
        assert_eq!(session.midi_note(), None);
        assert_eq!(session.frequency(), 0.0);
        assert_eq!(session.note_octave(), "");
        assert_eq!(session.accuracy(1.0), 0);
    }

    #[test]
    fn unvoiced_estimate_clears_note() {
        let (session, _, _) = session_with_counting();
        session.start().unwrap();
        session.ingest(&[0.1; 64], PitchEstimate::new(440.0, 0.9));
        session.ingest(&[0.1; 64], PitchEstimate::unvoiced());
        assert!(session.midi_note().is_none());
    }

    #[test]
    fn restart_resets_derived_state_and_history() {
        let (session, _, _) = session_with_counting();
        session.start().unwrap();
        session.ingest(&[0.5; 128], PitchEstimate::new(440.0, 0.9));
        session.stop();
        assert_eq!(session.midi_note(), Some(69), "stop keeps the last snapshot");

        session.start().unwrap();
        assert_eq!(session.midi_note(), None);
        assert_eq!(session.volume(), 0.0);
        assert!(session.raw_samples().is_empty());
    }

    #[test]
    fn rejected_precision_keeps_previous_value() {
        let (session, _, _) = session_with_counting();
        session.set_min_precision(0.6).unwrap();
        assert!(matches!(
            session.set_min_precision(1.5),
            Err(Error::InvalidPrecision(_))
        ));
        assert_eq!(session.min_precision(), 0.6);
    }

    #[test]
    fn set_parameters_is_all_or_nothing() {
        let (session, _, _) = session_with_counting();
        let before = session.config();
        assert!(session.set_parameters(48_000, 8192, 0.5, 2.0).is_err());
        assert_eq!(session.config(), before);

        session.set_parameters(48_000, 8192, 0.5, 0.7).unwrap();
        assert_eq!(session.sample_rate(), 48_000);
        assert_eq!(session.tolerance(), 0.5);
    }

    #[test]
    fn sample_rate_change_applies_on_next_start() {
        let (session, _, params) = session_with_counting();
        session.start().unwrap();
        session.set_sample_rate(22_050).unwrap();
        assert_eq!(params.lock().unwrap().sample_rate, 44_100);

        session.stop();
        session.start().unwrap();
        assert_eq!(params.lock().unwrap().sample_rate, 22_050);

        // History capacity follows the new rate
        session.ingest(&vec![0.1; 30_000], PitchEstimate::unvoiced());
        assert_eq!(session.raw_samples().len(), 22_050);
    }
}
