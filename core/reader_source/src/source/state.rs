use std::sync::Arc;

use log::warn;

use crate::{buffer::AudioBuffer, error::FrameError, frame::Frame, reader::FrameReader};

/// Everything the source mutates, guarded by the single lock in
/// [`ReaderSource`](super::ReaderSource).
///
/// Samples flow `Frame` -> `staging` -> destination. `position` counts the
/// samples actually delivered; `frame_offset` counts the samples already
/// pulled out of the held frame (which may run ahead of `position` while a
/// staged run is still being consumed).
#[derive(Debug)]
pub(super) struct State {
    /// Absolute sample offset of the next sample to serve.
    pub(super) position: u64,
    /// Offset the stream rewinds to when looping wraps.
    pub(super) start: u64,
    pub(super) repeat: bool,
    pub(super) prepared: bool,
    /// Frame index the held frame was fetched at.
    frame_number: u64,
    frame: Option<Arc<Frame>>,
    /// Consumed samples within the held frame.
    frame_offset: usize,
    staging: AudioBuffer,
    /// Valid samples in the current staged run.
    staged: usize,
    /// Consumed samples within the staged run.
    staged_read: usize,
}

impl State {
    pub(super) fn new(channel_count: usize, start: u64, buffer_size: usize) -> Self {
        Self {
            position: start,
            start,
            repeat: false,
            prepared: false,
            frame_number: 0,
            frame: None,
            frame_offset: 0,
            staging: AudioBuffer::new(channel_count, buffer_size),
            staged: 0,
            staged_read: 0,
        }
    }

    /// Drop the held frame and any staged samples. The next fill re-fetches
    /// from `position`.
    pub(super) fn invalidate(&mut self) {
        self.frame = None;
        self.frame_offset = 0;
        self.staged = 0;
        self.staged_read = 0;
    }

    pub(super) fn seek_to(&mut self, position: u64, nominal_frame_len: u64) {
        self.position = position;
        self.frame_number = position / nominal_frame_len;
        self.invalidate();
    }

    pub(super) fn set_staging(&mut self, buffer: AudioBuffer) {
        self.staging = buffer;
        // staged samples were already pulled out of the held frame, so the
        // frame cursor no longer matches `position`; refetch instead
        self.invalidate();
    }

    /// Copy up to `requested` samples per channel into `dest`, starting at
    /// destination offset 0. Returns the number of real samples written; the
    /// remainder of the requested range is zeroed.
    pub(super) fn fill(
        &mut self,
        reader: &dyn FrameReader,
        dest: &mut AudioBuffer,
        requested: usize,
    ) -> usize {
        let requested = requested.min(dest.capacity());
        if requested == 0 {
            return 0;
        }
        if !self.prepared {
            dest.clear_range(0, requested);
            return 0;
        }

        let mut written = 0;
        let mut wrapped = false;
        while written < requested {
            if self.staged_read == self.staged {
                match self.restage(reader) {
                    Ok(()) => wrapped = false,
                    Err(err) => {
                        if matches!(err, FrameError::Decode { .. }) {
                            warn!("treating reader failure as end of stream: {err}");
                        }
                        if self.repeat && !wrapped {
                            // retried once per exhaustion so a broken reader
                            // cannot spin inside the callback
                            wrapped = true;
                            self.position = self.start;
                            self.invalidate();
                            continue;
                        }
                        if !self.repeat {
                            self.position = total_length(reader);
                        }
                        self.invalidate();
                        dest.clear_range(written, requested);
                        return written;
                    }
                }
            }

            let run = (self.staged - self.staged_read).min(requested - written);
            let mapped = dest.channel_count().min(self.staging.channel_count());
            for ch in 0..mapped {
                let src = &self.staging.channel(ch)[self.staged_read..self.staged_read + run];
                dest.channel_mut(ch)[written..written + run].copy_from_slice(src);
            }
            // unmapped destination channels stay silent rather than
            // replicating a source channel
            for ch in mapped..dest.channel_count() {
                dest.channel_mut(ch)[written..written + run].fill(0.0);
            }
            self.staged_read += run;
            self.position += run as u64;
            written += run;
        }
        written
    }

    /// Refill the staging buffer from the frame covering `position`, fetching
    /// a fresh frame first if the held one is stale or drained.
    fn restage(&mut self, reader: &dyn FrameReader) -> Result<(), FrameError> {
        self.ensure_frame(reader)?;
        let Some(frame) = self.frame.clone() else {
            return Err(FrameError::Exhausted(self.frame_number));
        };

        let run = (frame.sample_count() - self.frame_offset).min(self.staging.capacity());
        if run == 0 {
            // zero-capacity staging must not wedge the fill loop
            self.frame = None;
            return Err(FrameError::Exhausted(self.frame_number));
        }

        let mapped = self.staging.channel_count().min(frame.channel_count());
        for ch in 0..mapped {
            let src = &frame.channel(ch)[self.frame_offset..self.frame_offset + run];
            self.staging.channel_mut(ch)[..run].copy_from_slice(src);
        }
        for ch in mapped..self.staging.channel_count() {
            self.staging.channel_mut(ch)[..run].fill(0.0);
        }
        self.frame_offset += run;
        self.staged = run;
        self.staged_read = 0;
        Ok(())
    }

    /// Make the held frame cover the current position. The frame's actual
    /// sample count is authoritative: a short final frame is exhausted when
    /// its real content runs out, not at the nominal frame length.
    fn ensure_frame(&mut self, reader: &dyn FrameReader) -> Result<(), FrameError> {
        let nominal = reader.samples_per_frame().max(1) as u64;
        let target = self.position / nominal;
        match &self.frame {
            Some(frame)
                if self.frame_number == target && self.frame_offset < frame.sample_count() =>
            {
                Ok(())
            }
            Some(frame) if self.frame_offset >= frame.sample_count() => {
                self.fetch(reader, self.frame_number + 1, 0)
            }
            _ => self.fetch(reader, target, (self.position % nominal) as usize),
        }
    }

    fn fetch(
        &mut self,
        reader: &dyn FrameReader,
        frame_number: u64,
        offset: usize,
    ) -> Result<(), FrameError> {
        if frame_number >= reader.total_frames() {
            self.frame = None;
            return Err(FrameError::Exhausted(frame_number));
        }
        let frame = reader.frame(frame_number)?;
        if offset >= frame.sample_count() {
            // a seek can land past the real content of a short final frame
            self.frame = None;
            return Err(FrameError::Exhausted(frame_number));
        }
        self.frame = Some(frame);
        self.frame_number = frame_number;
        self.frame_offset = offset;
        Ok(())
    }
}

fn total_length(reader: &dyn FrameReader) -> u64 {
    reader.total_frames() * reader.samples_per_frame() as u64
}
