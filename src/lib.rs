//! Keep a chart in step with video playback.
//!
//! A [`playback::PlaybackSession`] decides on every timer tick whether the
//! current frame advances, jumps, or stays put. A [`playback::VideoPlayer`]
//! carries that decision out against a [`decode::VideoSource`] and reports the
//! new position to a callback, typically one that redraws a cursor over a
//! [`chart::Series`].

pub mod chart;
pub mod config;
pub mod core;
pub mod decode;
pub mod input;
pub mod playback;

pub use config::{PlayerConfig, PositionUnit};
pub use playback::{FrameChange, PlaybackCommand, PlaybackEngine, PlaybackSession, PlaybackStatus, Position, VideoPlayer};
