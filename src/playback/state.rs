//! Playback status and per-tick frame decisions.

/// Playback status of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// Frames advance with wall-clock time
    Playing,
    /// Holding the current frame
    Paused,
    /// Show the next frame on the next tick, then pause
    StepForward,
    /// Show the previous frame on the next tick, then pause
    StepBackward,
    /// The frame index was set while paused; reposition on the next tick
    SeekPending,
    /// Source released, no further playback
    Stopped,
}

impl PlaybackStatus {
    /// Check if currently playing
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackStatus::Playing)
    }

    /// Check if paused
    pub fn is_paused(&self) -> bool {
        matches!(self, PlaybackStatus::Paused)
    }

    /// Check if stopped
    pub fn is_stopped(&self) -> bool {
        matches!(self, PlaybackStatus::Stopped)
    }
}

/// What the caller has to do with the source after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameChange {
    /// Nothing to show
    NoChange,
    /// The decoder is already positioned; read the next frame
    Advance,
    /// Reposition the decoder to the current frame index, then read
    Seek,
}

impl FrameChange {
    pub fn is_change(&self) -> bool {
        !matches!(self, FrameChange::NoChange)
    }
}
