use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use crate::{buffer::AudioBuffer, error::SourceError, reader::FrameReader, source::state::State};

mod state;

/// Exposes a [`FrameReader`] as a continuous, pull-based audio sample source.
///
/// The host engine pulls arbitrary sample counts with no awareness of frame
/// boundaries; this source tracks the read position across frames, restages
/// samples transparently as the position advances, and handles seeks and the
/// end-of-stream loop policy. The pull side runs on the real-time audio
/// thread; every other method may be called concurrently from a control
/// thread, so all mutable state sits behind one mutex that control calls hold
/// only for a variable swap.
#[derive(Debug)]
pub struct ReaderSource {
    reader: Arc<dyn FrameReader>,
    state: Mutex<State>,
}

impl ReaderSource {
    /// Bind a source to one reader. `starting_frame` is both the initial read
    /// position and the offset looping rewinds to; `buffer_size` caps how many
    /// samples one frame fetch can stage.
    pub fn new(reader: Arc<dyn FrameReader>, starting_frame: u64, buffer_size: usize) -> Self {
        let start = starting_frame * reader.samples_per_frame() as u64;
        let state = State::new(reader.channels(), start, buffer_size);
        Self {
            reader,
            state: Mutex::new(state),
        }
    }

    pub fn prepare(&self, expected_block_size: usize, sample_rate: f64) {
        debug!("preparing source: block size {expected_block_size}, sample rate {sample_rate}");
        self.state.lock().prepared = true;
    }

    /// Drop the held frame and staged samples and stop serving audio. Safe
    /// without a prior [`prepare`](Self::prepare); afterwards
    /// [`fill_next_samples`](Self::fill_next_samples) degrades to silence
    /// instead of faulting.
    pub fn release(&self) {
        debug!("releasing source resources");
        let mut state = self.state.lock();
        state.prepared = false;
        state.invalidate();
    }

    /// Pull up to `requested` samples per channel into `dest`, starting at
    /// destination offset 0.
    ///
    /// The first `requested` samples of every destination channel are always
    /// left defined, so the host never needs to retry: past end-of-stream
    /// (looping off) the remainder is silence. Returns the number of real
    /// samples written. Destination channels beyond the reader's channel
    /// count receive silence; extra reader channels are dropped.
    pub fn fill_next_samples(&self, dest: &mut AudioBuffer, requested: usize) -> usize {
        self.state.lock().fill(self.reader.as_ref(), dest, requested)
    }

    /// Move the read position to an absolute sample offset. Rejects negative
    /// offsets and offsets beyond [`total_length`](Self::total_length)
    /// without clamping, leaving the position unchanged.
    pub fn seek(&self, sample_offset: i64) -> Result<(), SourceError> {
        let total = self.total_length();
        if sample_offset < 0 || sample_offset as u64 > total {
            return Err(SourceError::OutOfRange {
                requested: sample_offset,
                total,
            });
        }
        debug!("seek to sample {sample_offset}");
        let nominal = self.reader.samples_per_frame().max(1) as u64;
        self.state.lock().seek_to(sample_offset as u64, nominal);
        Ok(())
    }

    /// Current absolute read position in samples.
    pub fn position(&self) -> u64 {
        self.state.lock().position
    }

    /// Stream length in samples, derived from the reader's frame count at its
    /// nominal frame length. Zero when the reader reports no frames.
    pub fn total_length(&self) -> u64 {
        self.reader.total_frames() * self.reader.samples_per_frame() as u64
    }

    /// Takes effect at the next end-of-stream, not retroactively.
    pub fn set_looping(&self, should_loop: bool) {
        self.state.lock().repeat = should_loop;
    }

    pub fn is_looping(&self) -> bool {
        self.state.lock().repeat
    }

    /// Swap the staging buffer. Staged samples are discarded and the next
    /// pull re-fetches the current frame, so playback stays continuous.
    pub fn set_staging_buffer(&self, buffer: AudioBuffer) {
        debug!(
            "swapping staging buffer ({} channels x {} samples)",
            buffer.channel_count(),
            buffer.capacity()
        );
        self.state.lock().set_staging(buffer);
    }
}
