//! Slider widgets mapped onto playback commands.

use crate::playback::engine::PlaybackCommand;
use crate::playback::session::DEFAULT_PLAYBACK_RATE;

/// Playback speed slider, in percent of normal speed
pub struct RateSlider;

impl RateSlider {
    pub const MAX_PERCENT: u32 = 400;

    /// Multiplier for a slider position. The far-left position means normal speed.
    pub fn to_multiplier(percent: u32) -> f64 {
        if percent == 0 {
            return DEFAULT_PLAYBACK_RATE;
        }
        f64::from(percent.min(Self::MAX_PERCENT)) / 100.0
    }

    /// Slider position showing `multiplier`
    pub fn position_for(multiplier: f64) -> u32 {
        (multiplier * 100.0).round().clamp(0.0, f64::from(Self::MAX_PERCENT)) as u32
    }

    pub fn command(percent: u32) -> PlaybackCommand {
        PlaybackCommand::SetRate(Self::to_multiplier(percent))
    }
}

/// Frame scrub bar spanning `0..=frame_count - 1`
#[derive(Debug, Clone, Copy)]
pub struct FrameScrubBar {
    frame_count: u64,
}

impl FrameScrubBar {
    pub fn new(frame_count: u64) -> Self {
        Self { frame_count }
    }

    /// Rightmost bar position
    pub fn max_position(&self) -> u64 {
        self.frame_count.saturating_sub(1)
    }

    /// Bar position showing `frame_index`; the end-of-stream index sits on
    /// the last position
    pub fn position_for(&self, frame_index: u64) -> u64 {
        frame_index.min(self.max_position())
    }

    /// The user dragged the bar to `position` while `current_index` is shown.
    /// Dropping it on the frame already shown is not a seek.
    pub fn command(&self, position: u64, current_index: u64) -> Option<PlaybackCommand> {
        let position = position.min(self.max_position());
        if position == self.position_for(current_index) {
            return None;
        }
        Some(PlaybackCommand::Seek(position.min(i64::MAX as u64) as i64))
    }
}
