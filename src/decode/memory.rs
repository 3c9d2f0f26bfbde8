//! Synthetic in-memory video source.
//!
//! Produces small solid-colour frames and records every read, seek and
//! release so that callers can check how the player drove it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use crate::core::time;
use crate::decode::source::{DecodeError, VideoFrame, VideoSource};
use crate::decode::stream_info::VideoStreamInfo;

/// Counters shared between a [`MemorySource`] and whoever created it
#[derive(Debug, Default)]
pub struct SourceStats {
    reads: Cell<usize>,
    seeks: RefCell<Vec<u64>>,
    releases: Cell<usize>,
}

impl SourceStats {
    /// Number of frames handed out
    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    /// Every seek target, in call order
    pub fn seeks(&self) -> Vec<u64> {
        self.seeks.borrow().clone()
    }

    /// How many times the source was released
    pub fn releases(&self) -> usize {
        self.releases.get()
    }
}

/// In-memory source of `frame_count` synthetic frames
pub struct MemorySource {
    info: VideoStreamInfo,
    position: u64,
    fail_seeks: bool,
    stats: Rc<SourceStats>,
}

impl MemorySource {
    pub const WIDTH: u32 = 4;
    pub const HEIGHT: u32 = 4;

    pub fn new(frame_count: u64, fps: f64) -> Self {
        Self {
            info: VideoStreamInfo {
                index: 0,
                codec_name: "synthetic".to_string(),
                width: Self::WIDTH,
                height: Self::HEIGHT,
                fps,
                frame_count,
            },
            position: 0,
            fail_seeks: false,
            stats: Rc::new(SourceStats::default()),
        }
    }

    /// Make every subsequent seek fail
    pub fn with_failing_seeks(mut self) -> Self {
        self.fail_seeks = true;
        self
    }

    pub fn stats(&self) -> Rc<SourceStats> {
        Rc::clone(&self.stats)
    }

    /// Index of the frame the next read returns
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl VideoSource for MemorySource {
    fn info(&self) -> &VideoStreamInfo {
        &self.info
    }

    fn read_next_frame(&mut self) -> Result<Option<VideoFrame>, DecodeError> {
        if self.position >= self.info.frame_count {
            return Ok(None);
        }

        let shade = (self.position % 256) as u8;
        let pixels = (Self::WIDTH * Self::HEIGHT) as usize;
        let frame = VideoFrame {
            data: [shade, shade, shade, 255].repeat(pixels),
            width: Self::WIDTH,
            height: Self::HEIGHT,
            timestamp: time::from_frame_index(self.position, self.info.fps),
        };

        self.position += 1;
        self.stats.reads.set(self.stats.reads.get() + 1);
        Ok(Some(frame))
    }

    fn seek_to_frame(&mut self, index: u64) -> Result<(), DecodeError> {
        if self.fail_seeks {
            return Err(DecodeError::SeekFailed {
                frame: index,
                reason: "seeking disabled".to_string(),
            });
        }
        self.stats.seeks.borrow_mut().push(index);
        self.position = index.min(self.info.frame_count);
        Ok(())
    }

    fn release(self) {
        self.stats.releases.set(self.stats.releases.get() + 1);
    }
}
