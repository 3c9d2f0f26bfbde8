//! Stream metadata reported by a video source.

use crate::core::time::{self, Time};

/// Information about the video stream being played
#[derive(Debug, Clone, PartialEq)]
pub struct VideoStreamInfo {
    pub index: usize,
    pub codec_name: String,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub frame_count: u64,
}

impl VideoStreamInfo {
    /// Total duration implied by frame count and frame rate (nanoseconds)
    pub fn duration(&self) -> Time {
        if self.fps > 0.0 {
            time::from_frame_index(self.frame_count, self.fps)
        } else {
            0
        }
    }
}

/// Frame count estimated from a stream duration when the container doesn't
/// carry one
pub fn estimate_frame_count(duration_secs: f64, fps: f64) -> u64 {
    if duration_secs <= 0.0 || fps <= 0.0 || !duration_secs.is_finite() {
        return 0;
    }
    (duration_secs * fps).round() as u64
}
