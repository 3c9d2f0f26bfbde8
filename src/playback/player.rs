//! Video player: a playback session bound to a video source and a frame callback.

use crate::config::{PlayerConfig, PositionUnit};
use crate::core::time::{self, Time};
use crate::decode::source::{DecodeError, VideoFrame, VideoSource};
use crate::playback::session::{PlaybackSession, SessionError};
use crate::playback::state::{FrameChange, PlaybackStatus};

/// Position handed to the frame callback.
///
/// This is the session's frame index, not the decoded frame's timestamp.
/// Until the source is first repositioned the two differ by one: the first
/// `Advance` after opening reports frame 1 while the source yields frame 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    Frame(u64),
    Seconds(f64),
}

impl Position {
    pub fn from_frame(index: u64, fps: f64, unit: PositionUnit) -> Self {
        match unit {
            PositionUnit::Frames => Position::Frame(index),
            PositionUnit::Seconds => Position::Seconds(time::frame_to_seconds(index, fps)),
        }
    }
}

/// Error type for the player
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("Video source unavailable: {0}")]
    SourceUnavailable(#[source] DecodeError),
    #[error("Invalid video source: {0}")]
    InvalidSource(#[from] SessionError),
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

type FrameCallback = Box<dyn FnMut(Position)>;

/// Drives a [`VideoSource`] from the decisions of a [`PlaybackSession`]
pub struct VideoPlayer<S: VideoSource> {
    session: PlaybackSession,
    source: Option<S>,
    position_unit: PositionUnit,
    on_frame: FrameCallback,
    current_frame: Option<VideoFrame>,
}

impl<S: VideoSource> VideoPlayer<S> {
    /// Bind a session to an opened source
    pub fn new<F>(source: S, config: &PlayerConfig, on_frame: F) -> Result<Self, PlayerError>
    where
        F: FnMut(Position) + 'static,
    {
        let mut session = PlaybackSession::new(source.frame_count(), source.frames_per_second())?;
        session.set_playback_rate(config.initial_rate());
        if config.autoplay {
            session.toggle_play_pause();
        }

        log::debug!(
            "Player created: {} frames @ {} fps, rate {}, {:?}",
            session.frame_count(),
            session.fps(),
            session.playback_rate(),
            session.status()
        );

        Ok(Self {
            session,
            source: Some(source),
            position_unit: config.position,
            on_frame: Box::new(on_frame),
            current_frame: None,
        })
    }

    /// Open a source with `open` and bind it.
    /// Any failure to open is reported as [`PlayerError::SourceUnavailable`].
    pub fn open_with<O, F>(open: O, config: &PlayerConfig, on_frame: F) -> Result<Self, PlayerError>
    where
        O: FnOnce() -> Result<S, DecodeError>,
        F: FnMut(Position) + 'static,
    {
        let source = open().map_err(PlayerError::SourceUnavailable)?;
        Self::new(source, config, on_frame)
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut PlaybackSession {
        &mut self.session
    }

    pub fn status(&self) -> PlaybackStatus {
        self.session.status()
    }

    pub fn current_frame_index(&self) -> u64 {
        self.session.current_frame_index()
    }

    /// The most recently decoded frame, for whatever displays it
    pub fn current_frame(&self) -> Option<&VideoFrame> {
        self.current_frame.as_ref()
    }

    pub fn source(&self) -> Option<&S> {
        self.source.as_ref()
    }

    pub fn is_stopped(&self) -> bool {
        self.session.status().is_stopped()
    }

    /// Evaluate the session at `now` and act on the result
    pub fn tick(&mut self, now: Time) -> Result<FrameChange, PlayerError> {
        if self.is_stopped() {
            return Ok(FrameChange::NoChange);
        }
        let change = self.session.evaluate_tick(now);
        if change.is_change() {
            self.apply_change(change)?;
        }
        Ok(change)
    }

    /// Read (and for a seek, first reposition) the source, then report the
    /// new position. Source errors are returned as-is.
    ///
    /// An `Advance` reads sequentially, so the reported index runs one ahead
    /// of the decoded frame until the first `Seek` (see [`Position`]).
    pub fn apply_change(&mut self, change: FrameChange) -> Result<(), PlayerError> {
        let Some(source) = self.source.as_mut() else {
            return Ok(());
        };

        let index = self.session.current_frame_index();
        match change {
            FrameChange::NoChange => return Ok(()),
            FrameChange::Advance => {}
            FrameChange::Seek => source.seek_to_frame(index)?,
        }

        match source.read_next_frame()? {
            Some(frame) => {
                self.current_frame = Some(frame);
                let position = Position::from_frame(index, self.session.fps(), self.position_unit);
                (self.on_frame)(position);
            }
            None => {
                log::debug!("End of stream at frame {}", index);
                self.session.mark_end_of_stream();
            }
        }
        Ok(())
    }

    /// Stop playback and release the source. Safe to call more than once.
    pub fn stop(&mut self) {
        self.session.stop();
        if let Some(source) = self.source.take() {
            log::info!("Stopping playback at frame {}", self.session.current_frame_index());
            source.release();
        }
        self.current_frame = None;
    }
}

impl<S: VideoSource> Drop for VideoPlayer<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
