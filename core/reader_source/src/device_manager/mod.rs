use std::sync::Arc;

use cpal::Sample as _;
use thiserror::Error;

use crate::{buffer::AudioBuffer, source::ReaderSource};

pub mod cpal_dm;

#[derive(Clone, Debug, Error)]
pub enum AudioDeviceError {
    #[error("no output device available")]
    DeviceNotFound,
    #[error("failed to build output stream: {0}")]
    StreamBuildFailed(String),
    #[error("failed to start output stream: {0}")]
    StreamStartFailed(String),
}

/// The interleaved destination formats a device callback may hand us.
#[derive(Debug)]
pub enum AudioSourceBufferKind<'a> {
    F32(&'a mut [f32]),
    I16(&'a mut [i16]),
    U16(&'a mut [u16]),
}

/// Anything that can serve a device output callback with `frame_size`
/// interleaved frames.
pub trait AudioSource: Send {
    fn fill_buffer(&mut self, buffer: AudioSourceBufferKind<'_>, frame_size: usize);
}

pub trait AudioDeviceManager {
    fn start_output_stream(
        &mut self,
        audio_source: Box<dyn AudioSource>,
    ) -> Result<(), AudioDeviceError>;
}

/// Drives a [`ReaderSource`] from a device callback, interleaving its planar
/// output into whatever sample format the device negotiated.
#[derive(Debug)]
pub struct SourcePlayback {
    source: Arc<ReaderSource>,
    scratch: AudioBuffer,
}

impl SourcePlayback {
    /// `max_block_size` bounds how many frames a single callback may request;
    /// larger callbacks are served with a silent tail.
    pub fn new(source: Arc<ReaderSource>, channel_count: usize, max_block_size: usize) -> Self {
        Self {
            source,
            scratch: AudioBuffer::new(channel_count, max_block_size),
        }
    }

    fn interleave<T>(&self, data: &mut [T], device_frames: usize, filled: usize)
    where
        T: cpal::FromSample<f32>,
    {
        if device_frames == 0 {
            return;
        }
        let device_channels = data.len() / device_frames;
        for (i, sample) in data.iter_mut().enumerate() {
            let frame = i / device_channels;
            let channel = i % device_channels;
            let raw = if frame < filled && channel < self.scratch.channel_count() {
                self.scratch.channel(channel)[frame]
            } else {
                0.0
            };
            *sample = raw.to_sample::<T>();
        }
    }
}

impl AudioSource for SourcePlayback {
    fn fill_buffer(&mut self, buffer: AudioSourceBufferKind<'_>, frame_size: usize) {
        let filled = frame_size.min(self.scratch.capacity());
        self.source.fill_next_samples(&mut self.scratch, filled);

        match buffer {
            AudioSourceBufferKind::F32(data) => self.interleave(data, frame_size, filled),
            AudioSourceBufferKind::I16(data) => self.interleave(data, frame_size, filled),
            AudioSourceBufferKind::U16(data) => self.interleave(data, frame_size, filled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::RampReader;

    fn playback(channels: usize) -> SourcePlayback {
        let source = Arc::new(ReaderSource::new(
            Arc::new(RampReader::new(channels, 4, 12)),
            0,
            8,
        ));
        source.prepare(512, 44_100.0);
        SourcePlayback::new(source, channels, 8)
    }

    #[test]
    fn test_playback_interleaves_planar_output() {
        let mut playback = playback(2);
        let mut data = [0.0f32; 8]; // 4 stereo frames
        playback.fill_buffer(AudioSourceBufferKind::F32(&mut data), 4);
        // left channel is the ramp, right channel is offset by 10_000
        assert_eq!(
            data,
            [0.0, 10_000.0, 1.0, 10_001.0, 2.0, 10_002.0, 3.0, 10_003.0]
        );
    }

    #[test]
    fn test_mono_source_leaves_second_device_channel_silent() {
        let mut playback = playback(1);
        let mut data = [0.5f32; 4]; // 2 stereo frames from a mono source
        playback.fill_buffer(AudioSourceBufferKind::F32(&mut data), 2);
        assert_eq!(data, [0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_oversized_callback_gets_a_silent_tail() {
        let mut playback = playback(1); // scratch capped at 8 frames
        let mut data = [0.25f32; 10];
        playback.fill_buffer(AudioSourceBufferKind::F32(&mut data), 10);
        assert_eq!(&data[..8], &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(&data[8..], &[0.0, 0.0]);
    }
}
