//! Rolling sample history.
//!
//! Fixed-capacity FIFO over two parallel queues: raw f32 samples and
//! their 16-bit little-endian PCM encoding (2 bytes per sample). Holds
//! one second of audio by default; the oldest sample is evicted per
//! overflowing append, so the queues never exceed capacity and always
//! stay in lock-step.

use std::collections::VecDeque;

/// Bounded FIFO of raw and PCM-encoded samples.
///
/// Invariant: `pcm.len() == 2 * raw.len()` and `raw.len() <= capacity`.
#[derive(Debug)]
pub struct SampleHistory {
    raw: VecDeque<f32>,
    pcm: VecDeque<u8>,
    capacity: usize,
}

impl SampleHistory {
    /// Create a history holding up to `capacity` samples.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            raw: VecDeque::with_capacity(capacity),
            pcm: VecDeque::with_capacity(capacity * 2),
            capacity,
        }
    }

    /// Append one sample, evicting the oldest sample (and its two PCM
    /// bytes) once the history is full.
    pub fn push(&mut self, sample: f32) {
        let encoded = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        let bytes = encoded.to_le_bytes();

        self.raw.push_back(sample);
        self.pcm.push_back(bytes[0]);
        self.pcm.push_back(bytes[1]);

        if self.raw.len() > self.capacity {
            self.raw.pop_front();
            self.pcm.pop_front();
            self.pcm.pop_front();
        }
    }

    /// Append every sample of a frame in order.
    pub fn extend(&mut self, frame: &[f32]) {
        for &sample in frame {
            self.push(sample);
        }
    }

    /// Point-in-time copy of the retained raw samples, oldest first.
    pub fn snapshot_raw(&self) -> Vec<f32> {
        self.raw.iter().copied().collect()
    }

    /// Point-in-time copy of the retained PCM bytes, oldest first.
    pub fn snapshot_pcm(&self) -> Vec<u8> {
        self.pcm.iter().copied().collect()
    }

    /// Drop all retained samples and adopt a new capacity.
    pub fn reset(&mut self, capacity: usize) {
        self.raw.clear();
        self.pcm.clear();
        self.capacity = capacity;
    }

    /// Number of samples currently retained.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Maximum number of retained samples.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
