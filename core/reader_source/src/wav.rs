use std::{io::Read, path::Path, sync::Arc};

use hound::WavReader;

use crate::{
    error::{FrameError, WavError},
    frame::Frame,
    reader::FrameReader,
};

/// A [`FrameReader`] over an in-memory, planar PCM
/// buffer loaded from a `.wav` file, serving fixed-length frames (the final
/// frame may be shorter).
///
/// Supports:
/// - Any channel count (kept at the file's native layout)
/// - 16-bit integer or 32-bit float samples (converted to `f32`)
///
/// Does NOT support:
/// - Resampling (frames are served at the file's native rate)
///
/// # Example
/// ```no_run
/// use reader_source::wav::WavFrameReader;
///
/// let reader = WavFrameReader::from_file("assets/wav/piano.wav", 1024).unwrap();
/// ```
#[derive(Debug)]
pub struct WavFrameReader {
    /// Planar samples, one inner vec per channel.
    channels: Vec<Vec<f32>>,
    samples_per_frame: usize,
    sample_rate: u32,
}

impl WavFrameReader {
    pub fn from_file<P: AsRef<Path>>(path: P, samples_per_frame: usize) -> Result<Self, WavError> {
        Self::from_reader(WavReader::open(path)?, samples_per_frame)
    }

    pub fn from_stream<R: Read>(stream: R, samples_per_frame: usize) -> Result<Self, WavError> {
        Self::from_reader(WavReader::new(stream)?, samples_per_frame)
    }

    fn from_reader<R: Read>(
        reader: WavReader<R>,
        samples_per_frame: usize,
    ) -> Result<Self, WavError> {
        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(WavError::NoChannels);
        }

        let raw = match spec.sample_format {
            hound::SampleFormat::Int => reader
                .into_samples::<i16>()
                .filter_map(Result::ok)
                .map(|s| f32::from(s) / f32::from(i16::MAX))
                .collect::<Vec<f32>>(),
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .filter_map(Result::ok)
                .collect::<Vec<f32>>(),
        };

        Ok(Self {
            channels: Self::deinterleave(&raw, spec.channels as usize),
            samples_per_frame: samples_per_frame.max(1),
            sample_rate: spec.sample_rate,
        })
    }

    /// Split interleaved samples into one run per channel.
    fn deinterleave(raw: &[f32], channel_count: usize) -> Vec<Vec<f32>> {
        let mut channels = vec![Vec::with_capacity(raw.len() / channel_count); channel_count];
        for (i, &sample) in raw.iter().enumerate() {
            channels[i % channel_count].push(sample);
        }
        channels
    }

    fn total_samples(&self) -> u64 {
        self.channels.first().map_or(0, Vec::len) as u64
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl FrameReader for WavFrameReader {
    fn frame(&self, frame_number: u64) -> Result<Arc<Frame>, FrameError> {
        if frame_number >= self.total_frames() {
            return Err(FrameError::Exhausted(frame_number));
        }
        let first = (frame_number * self.samples_per_frame as u64) as usize;
        let len = (self.total_samples() as usize - first).min(self.samples_per_frame);
        let channels = self
            .channels
            .iter()
            .map(|ch| ch[first..first + len].to_vec())
            .collect();
        Ok(Arc::new(Frame::new(channels)))
    }

    fn total_frames(&self) -> u64 {
        self.total_samples().div_ceil(self.samples_per_frame as u64)
    }

    fn samples_per_frame(&self) -> usize {
        self.samples_per_frame
    }

    fn channels(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{buffer::AudioBuffer, source::ReaderSource};
    use hound::WavSpec;
    use std::io::Cursor;

    fn create_wav_buffer(spec: WavSpec, samples: &[i16]) -> Cursor<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut buffer, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        buffer.set_position(0);
        buffer
    }

    fn mono_spec() -> WavSpec {
        WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }

    #[test]
    fn test_frames_carry_scaled_samples() {
        let buffer = create_wav_buffer(mono_spec(), &[i16::MAX, 0, i16::MIN / 2 + 1, 0, i16::MAX]);
        let reader = WavFrameReader::from_stream(buffer, 4).unwrap();

        assert_eq!(reader.channels(), 1);
        assert_eq!(reader.samples_per_frame(), 4);
        assert_eq!(reader.total_frames(), 2);
        assert_eq!(reader.sample_rate(), 44100);

        let frame = reader.frame(0).unwrap();
        assert_eq!(frame.sample_count(), 4);
        assert!((frame.channel(0)[0] - 1.0).abs() < 1e-6);
        assert_eq!(frame.channel(0)[1], 0.0);
        assert!((frame.channel(0)[2] + 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_final_frame_is_short() {
        let buffer = create_wav_buffer(mono_spec(), &[100; 5]);
        let reader = WavFrameReader::from_stream(buffer, 4).unwrap();

        assert_eq!(reader.frame(1).unwrap().sample_count(), 1);
        assert!(matches!(reader.frame(2), Err(FrameError::Exhausted(2))));
    }

    #[test]
    fn test_stereo_wav_is_deinterleaved() {
        let spec = WavSpec {
            channels: 2,
            ..mono_spec()
        };
        // L = 1000, 3000; R = 2000, 4000
        let buffer = create_wav_buffer(spec, &[1000, 2000, 3000, 4000]);
        let reader = WavFrameReader::from_stream(buffer, 4).unwrap();

        assert_eq!(reader.channels(), 2);
        let frame = reader.frame(0).unwrap();
        assert_eq!(frame.sample_count(), 2);
        assert!(frame.channel(0)[0] < frame.channel(1)[0]);
        assert!((frame.channel(1)[1] - 4000.0 / f32::from(i16::MAX)).abs() < 1e-6);
    }

    #[test]
    fn test_wav_reader_plays_through_a_source() {
        let buffer = create_wav_buffer(mono_spec(), &[8000, -8000, 8000, -8000, 8000, -8000]);
        let reader = WavFrameReader::from_stream(buffer, 4).unwrap();
        let source = ReaderSource::new(Arc::new(reader), 0, 8);
        source.prepare(512, 44_100.0);

        let mut dest = AudioBuffer::new(1, 8);
        // 6 real samples, then silence padding
        assert_eq!(source.fill_next_samples(&mut dest, 8), 6);
        assert!(dest.channel(0)[0] > 0.0);
        assert!(dest.channel(0)[1] < 0.0);
        assert_eq!(&dest.channel(0)[6..], &[0.0, 0.0]);
    }

    #[test]
    fn test_invalid_wav_stream_is_rejected() {
        let result = WavFrameReader::from_stream(Cursor::new(vec![0u8; 16]), 4);
        assert!(result.is_err());
    }
}
