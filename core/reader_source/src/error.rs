use thiserror::Error;

/// Errors surfaced to the control thread by configuration calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// A seek target outside `[0, total_length()]`. The position is left
    /// unchanged; callers are expected to clamp before seeking.
    #[error("read position {requested} is outside the stream (total length {total})")]
    OutOfRange { requested: i64, total: u64 },
}

/// Errors produced by a [`FrameReader`](crate::reader::FrameReader).
///
/// These never cross the real-time boundary: the fill path absorbs both
/// variants into loop-restart or silence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// The requested frame is past the end of the stream.
    #[error("frame {0} is past the end of the stream")]
    Exhausted(u64),

    /// The reader failed to produce a frame it should have.
    #[error("failed to produce frame {frame_number}: {reason}")]
    Decode { frame_number: u64, reason: String },
}

/// Errors from loading a WAV file into a [`WavFrameReader`](crate::wav::WavFrameReader).
#[derive(Debug, Error)]
pub enum WavError {
    #[error("failed to read WAV data: {0}")]
    Read(#[from] hound::Error),

    #[error("WAV stream reports zero channels")]
    NoChannels,
}
