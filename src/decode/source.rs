//! Video source collaborator used by the player.
//!
//! The playback state machine never touches a source directly; the player
//! calls these methods after a tick has decided what has to happen.

use std::path::PathBuf;
use crate::core::time::Time;
use crate::decode::stream_info::VideoStreamInfo;

/// Error type for decoding operations
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("FFmpeg error: {0}")]
    FFmpeg(String),
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("No video stream found")]
    NoVideoStream,
    #[error("Seek to frame {frame} failed: {reason}")]
    SeekFailed { frame: u64, reason: String },
    #[error("Source has already been released")]
    Released,
}

/// Decoded video frame (RGBA8)
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub data: Vec<u8>,      // Raw pixel data (RGBA8)
    pub width: u32,
    pub height: u32,
    pub timestamp: Time,    // Presentation time in nanoseconds
}

/// A seekable, sequentially readable video stream
pub trait VideoSource {
    /// Stream metadata, fixed for the lifetime of the source
    fn info(&self) -> &VideoStreamInfo;

    /// Decode the frame following the last one read.
    /// `Ok(None)` signals end of stream.
    fn read_next_frame(&mut self) -> Result<Option<VideoFrame>, DecodeError>;

    /// Reposition so that the next read returns frame `index`
    fn seek_to_frame(&mut self, index: u64) -> Result<(), DecodeError>;

    /// Release the underlying resources
    fn release(self);

    fn frame_count(&self) -> u64 {
        self.info().frame_count
    }

    fn frames_per_second(&self) -> f64 {
        self.info().fps
    }
}
