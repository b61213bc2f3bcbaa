//! Audio capture collaborator seam.
//!
//! The engine never touches microphones or capture threads itself; it
//! signals start/stop to whatever owns the capture loop. Implementations
//! deliver frames back through [`DetectionSession::ingest`](crate::DetectionSession::ingest)
//! together with an estimator reading.

use crate::config::StreamParams;
use crate::error::Result;

/// Start/stop interface to the external capture pipeline.
pub trait AudioCapture: Send {
    /// Begin delivering frames shaped by `params`.
    ///
    /// An error here leaves the session Idle and surfaces as
    /// [`Error::StartFailed`](crate::Error::StartFailed).
    fn start(&mut self, params: StreamParams) -> Result<()>;

    /// Stop delivering frames. Must tolerate being called when already
    /// stopped.
    fn stop(&mut self);
}

/// Capture stub that accepts every signal and records nothing.
///
/// Useful when frames are pushed from an existing pipeline and there is
/// no capture device to manage.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCapture;

impl AudioCapture for NullCapture {
    fn start(&mut self, _params: StreamParams) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) {}
}
