pub mod buffer;
pub mod device_manager;
pub mod error;
pub mod frame;
pub mod reader;
pub mod source;
pub mod wav;

pub use buffer::AudioBuffer;
pub use error::{FrameError, SourceError, WavError};
pub use frame::Frame;
pub use reader::FrameReader;
pub use source::ReaderSource;
