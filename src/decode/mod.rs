pub mod memory;
pub mod source;
pub mod stream_info;
#[cfg(feature = "ffmpeg")]
pub mod decoder;

pub use memory::{MemorySource, SourceStats};
pub use source::{DecodeError, VideoFrame, VideoSource};
pub use stream_info::VideoStreamInfo;
#[cfg(feature = "ffmpeg")]
pub use decoder::FfmpegSource;
