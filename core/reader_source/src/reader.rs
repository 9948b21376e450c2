use std::{fmt, sync::Arc};

use crate::{error::FrameError, frame::Frame};

/// A frame-oriented media reader, addressed by non-negative frame index.
/// Implemented by `WavFrameReader` and future decoders/streamers.
///
/// Readers are shared read-only across sources; `frame` must be safe to call
/// concurrently, and latency-sensitive callers rely on it being bounded (no
/// unbounded I/O waits).
pub trait FrameReader: Send + Sync + fmt::Debug {
    /// Produce the decoded frame at `frame_number`.
    fn frame(&self, frame_number: u64) -> Result<Arc<Frame>, FrameError>;

    /// Number of frames in the stream.
    fn total_frames(&self) -> u64;

    /// Nominal samples per channel in each frame. The last frame of a stream
    /// may carry fewer.
    fn samples_per_frame(&self) -> usize;

    /// Channel count of the decoded stream.
    fn channels(&self) -> usize;
}

/// Serves a deterministic ramp (sample at absolute offset `p`, channel `c`
/// equals `p + 10_000 * c`) so tests can assert exactly which sample landed
/// where.
#[cfg(test)]
#[derive(Debug)]
pub struct RampReader {
    pub channels: usize,
    pub samples_per_frame: usize,
    pub total_samples: u64,
    /// Frame index that fails with a decode error, if any.
    pub broken_frame: Option<u64>,
}

#[cfg(test)]
impl RampReader {
    pub fn new(channels: usize, samples_per_frame: usize, total_samples: u64) -> Self {
        Self {
            channels,
            samples_per_frame,
            total_samples,
            broken_frame: None,
        }
    }

    pub fn sample_at(channel: usize, position: u64) -> f32 {
        position as f32 + 10_000.0 * channel as f32
    }
}

#[cfg(test)]
impl FrameReader for RampReader {
    fn frame(&self, frame_number: u64) -> Result<Arc<Frame>, FrameError> {
        if frame_number >= self.total_frames() {
            return Err(FrameError::Exhausted(frame_number));
        }
        if self.broken_frame == Some(frame_number) {
            return Err(FrameError::Decode {
                frame_number,
                reason: "scripted failure".to_owned(),
            });
        }
        let first = frame_number * self.samples_per_frame as u64;
        let len = (self.total_samples - first).min(self.samples_per_frame as u64) as usize;
        let channels = (0..self.channels)
            .map(|c| (0..len).map(|i| Self::sample_at(c, first + i as u64)).collect())
            .collect();
        Ok(Arc::new(Frame::new(channels)))
    }

    fn total_frames(&self) -> u64 {
        self.total_samples.div_ceil(self.samples_per_frame as u64)
    }

    fn samples_per_frame(&self) -> usize {
        self.samples_per_frame
    }

    fn channels(&self) -> usize {
        self.channels
    }
}
