use std::sync::Arc;

use reader_source::{
    FrameReader as _, ReaderSource,
    device_manager::{AudioDeviceManager as _, SourcePlayback, cpal_dm::CpalAudioDeviceManager},
    wav::WavFrameReader,
};

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./assets/wav/piano.wav".to_owned());

    let reader = match WavFrameReader::from_file(&path, 1024) {
        Ok(reader) => Arc::new(reader),
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            return;
        }
    };
    let channels = reader.channels();

    let source = Arc::new(ReaderSource::new(reader, 0, 4096));
    source.prepare(512, 44100.0);
    source.set_looping(true);

    let playback = SourcePlayback::new(Arc::clone(&source), channels, 4096);
    let mut manager = CpalAudioDeviceManager::new();

    match manager.start_output_stream(Box::new(playback)) {
        Ok(()) => {
            println!("Audio stream started, looping {path}.");
            std::thread::park(); // Keep main alive to keep stream alive
        }
        Err(e) => eprintln!("Failed to start audio stream: {e}"),
    }
}
