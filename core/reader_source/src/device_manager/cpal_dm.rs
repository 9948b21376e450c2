use cpal::{
    OutputCallbackInfo,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use log::error;

use super::{AudioDeviceError, AudioDeviceManager, AudioSource, AudioSourceBufferKind};

/// Opens the default cpal output device and feeds its callback from an
/// [`AudioSource`].
pub struct CpalAudioDeviceManager {
    stream: Option<cpal::Stream>,
}

impl CpalAudioDeviceManager {
    pub fn new() -> Self {
        Self { stream: None }
    }

    fn build_output_stream<T, C>(
        &self,
        device: &cpal::Device,
        config: cpal::SupportedStreamConfig,
        mut cb: C,
    ) -> Result<cpal::Stream, AudioDeviceError>
    where
        T: cpal::SizedSample,
        C: FnMut(&mut [T], usize) + Send + 'static,
    {
        let error_cb = move |err| {
            error!("stream error: {err}");
        };

        let channels = config.channels() as usize;
        let data_cb = move |data: &mut [T], _: &OutputCallbackInfo| {
            let frame_size = data.len() / channels;
            cb(data, frame_size);
        };

        let stream = device
            .build_output_stream(&config.into(), data_cb, error_cb, None)
            .map_err(|e| AudioDeviceError::StreamBuildFailed(e.to_string()))?;

        Ok(stream)
    }
}

impl Default for CpalAudioDeviceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioDeviceManager for CpalAudioDeviceManager {
    fn start_output_stream(
        &mut self,
        mut audio_source: Box<dyn AudioSource>,
    ) -> Result<(), AudioDeviceError> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or(AudioDeviceError::DeviceNotFound)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioDeviceError::StreamBuildFailed(e.to_string()))?;

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                self.build_output_stream(&device, config, move |data, frame_size| {
                    audio_source.fill_buffer(AudioSourceBufferKind::F32(data), frame_size);
                })?
            }
            cpal::SampleFormat::I16 => {
                self.build_output_stream(&device, config, move |data, frame_size| {
                    audio_source.fill_buffer(AudioSourceBufferKind::I16(data), frame_size);
                })?
            }
            cpal::SampleFormat::U16 => {
                self.build_output_stream(&device, config, move |data, frame_size| {
                    audio_source.fill_buffer(AudioSourceBufferKind::U16(data), frame_size);
                })?
            }
            format => {
                return Err(AudioDeviceError::StreamBuildFailed(format!(
                    "Unsupported sample format '{format}'"
                )));
            }
        };

        stream
            .play()
            .map_err(|e| AudioDeviceError::StreamStartFailed(e.to_string()))?;

        self.stream = Some(stream);
        Ok(())
    }
}
