//! Frame-advance state machine.
//!
//! A `PlaybackSession` owns no I/O. The host polls [`PlaybackSession::evaluate_tick`]
//! with the current monotonic time and gets back a [`FrameChange`] telling it
//! whether to read the next frame, reposition the source, or do nothing.
//! Frame skipping is driven by elapsed time rather than by tick count, so the
//! playback speed doesn't depend on how often the host polls.

use crate::core::time::{self, Time};
use crate::playback::state::{FrameChange, PlaybackStatus};

/// Rate used when a non-positive multiplier is requested
pub const DEFAULT_PLAYBACK_RATE: f64 = 1.0;

/// Fraction of a frame forgiven when flooring elapsed frames, so that ticks
/// landing exactly on a frame boundary survive nanosecond rounding
const FRAME_BOUNDARY_TOLERANCE: f64 = 1e-6;

/// Error type for session creation
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(f64),
}

/// Playback state for one open video
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    status: PlaybackStatus,
    current_frame_index: u64,
    frame_count: u64,
    fps: f64,
    playback_rate: f64,
    last_frame_displayed_at: Option<Time>,
    resync_pending: bool,
}

impl PlaybackSession {
    /// Create a session positioned at frame 0, paused
    pub fn new(frame_count: u64, fps: f64) -> Result<Self, SessionError> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(SessionError::InvalidFrameRate(fps));
        }

        Ok(Self {
            status: PlaybackStatus::Paused,
            current_frame_index: 0,
            frame_count,
            fps,
            playback_rate: DEFAULT_PLAYBACK_RATE,
            last_frame_displayed_at: None,
            resync_pending: false,
        })
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn current_frame_index(&self) -> u64 {
        self.current_frame_index
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn playback_rate(&self) -> f64 {
        self.playback_rate
    }

    pub fn last_frame_displayed_at(&self) -> Option<Time> {
        self.last_frame_displayed_at
    }

    /// Presentation time of the current frame in seconds
    pub fn current_seconds(&self) -> f64 {
        time::frame_to_seconds(self.current_frame_index, self.fps)
    }

    pub fn is_at_end(&self) -> bool {
        self.current_frame_index >= self.frame_count
    }

    /// Decide what happens to the current frame at time `now`
    pub fn evaluate_tick(&mut self, now: Time) -> FrameChange {
        match self.status {
            PlaybackStatus::Playing => self.evaluate_playing(now),
            PlaybackStatus::StepForward => {
                self.enter_paused();
                if self.current_frame_index < self.frame_count {
                    self.current_frame_index += 1;
                    // The source is only at the next frame if no jump is outstanding
                    if std::mem::take(&mut self.resync_pending) {
                        FrameChange::Seek
                    } else {
                        FrameChange::Advance
                    }
                } else {
                    FrameChange::NoChange
                }
            }
            PlaybackStatus::StepBackward => {
                self.enter_paused();
                if self.current_frame_index > 0 {
                    self.current_frame_index -= 1;
                    self.resync_pending = false;
                    FrameChange::Seek
                } else {
                    FrameChange::NoChange
                }
            }
            PlaybackStatus::SeekPending => {
                self.enter_paused();
                self.resync_pending = false;
                FrameChange::Seek
            }
            PlaybackStatus::Paused => {
                self.last_frame_displayed_at = None;
                FrameChange::NoChange
            }
            PlaybackStatus::Stopped => FrameChange::NoChange,
        }
    }

    fn evaluate_playing(&mut self, now: Time) -> FrameChange {
        if self.is_at_end() {
            log::debug!("Reached end at frame {}, pausing", self.frame_count);
            self.enter_paused();
            return FrameChange::NoChange;
        }

        if self.resync_pending {
            self.resync_pending = false;
            self.last_frame_displayed_at = Some(now);
            return FrameChange::Seek;
        }

        let Some(last) = self.last_frame_displayed_at else {
            self.last_frame_displayed_at = Some(now);
            return FrameChange::NoChange;
        };

        let frames_elapsed = self.frames_elapsed(now - last);
        if frames_elapsed == 0 {
            return FrameChange::NoChange;
        }

        let target = self
            .current_frame_index
            .saturating_add(frames_elapsed)
            .min(self.frame_count);
        let advanced = target - self.current_frame_index;
        self.current_frame_index = target;
        self.last_frame_displayed_at = Some(now);

        if advanced > 1 {
            FrameChange::Seek
        } else {
            FrameChange::Advance
        }
    }

    /// Whole frames covered by `elapsed` at the current fps and rate
    fn frames_elapsed(&self, elapsed: Time) -> u64 {
        if elapsed <= 0 {
            return 0;
        }
        let interval = time::frame_interval(self.fps, self.playback_rate);
        (elapsed as f64 / interval + FRAME_BOUNDARY_TOLERANCE).floor() as u64
    }

    fn enter_paused(&mut self) {
        self.status = PlaybackStatus::Paused;
        self.last_frame_displayed_at = None;
    }

    /// Set the playback speed multiplier; non-positive values mean normal speed
    pub fn set_playback_rate(&mut self, multiplier: f64) {
        self.playback_rate = if multiplier.is_finite() && multiplier > 0.0 {
            multiplier
        } else {
            if multiplier != 0.0 {
                log::warn!("Ignoring playback rate {}, using {}", multiplier, DEFAULT_PLAYBACK_RATE);
            }
            DEFAULT_PLAYBACK_RATE
        };
    }

    /// Jump to `target`, clamped to `[0, frame_count]`.
    ///
    /// While paused the jump is applied on the next tick as a seek. While
    /// playing the next tick repositions the source and restarts wall-clock
    /// accounting from that tick. A pending step forward still happens, from
    /// the new index, as a seek.
    pub fn request_seek(&mut self, target: i64) {
        if self.status.is_stopped() {
            return;
        }

        let clamped = target.clamp(0, self.frame_count.min(i64::MAX as u64) as i64) as u64;
        if clamped as i64 != target {
            log::debug!("Seek target {} clamped to {}", target, clamped);
        }
        self.current_frame_index = clamped;

        match self.status {
            PlaybackStatus::Paused => self.status = PlaybackStatus::SeekPending,
            PlaybackStatus::Playing | PlaybackStatus::StepForward => self.resync_pending = true,
            _ => {}
        }
    }

    /// Play when paused, pause otherwise
    pub fn toggle_play_pause(&mut self) {
        match self.status {
            PlaybackStatus::Paused => self.status = PlaybackStatus::Playing,
            PlaybackStatus::SeekPending => {
                // Keep the pending jump: it is applied on the first playing tick
                self.status = PlaybackStatus::Playing;
                self.resync_pending = true;
            }
            PlaybackStatus::Playing | PlaybackStatus::StepForward | PlaybackStatus::StepBackward => {
                self.enter_paused();
            }
            PlaybackStatus::Stopped => return,
        }
        log::debug!("Playback {:?} at frame {}", self.status, self.current_frame_index);
    }

    pub fn request_step_forward(&mut self) {
        if !self.status.is_stopped() {
            self.status = PlaybackStatus::StepForward;
        }
    }

    pub fn request_step_backward(&mut self) {
        if !self.status.is_stopped() {
            self.status = PlaybackStatus::StepBackward;
        }
    }

    /// The source ran out of frames before `frame_count`
    pub fn mark_end_of_stream(&mut self) {
        self.current_frame_index = self.frame_count;
    }

    /// Enter the terminal state. Returns false if already stopped.
    pub fn stop(&mut self) -> bool {
        if self.status.is_stopped() {
            return false;
        }
        self.status = PlaybackStatus::Stopped;
        self.last_frame_displayed_at = None;
        self.resync_pending = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing(frame_count: u64, fps: f64) -> PlaybackSession {
        let mut session = PlaybackSession::new(frame_count, fps).unwrap();
        session.toggle_play_pause();
        session
    }

    /// Start the wall clock at `start` and return the session
    fn started(frame_count: u64, fps: f64, start: Time) -> PlaybackSession {
        let mut session = playing(frame_count, fps);
        assert_eq!(session.evaluate_tick(start), FrameChange::NoChange);
        session
    }

    #[test]
    fn test_new_rejects_bad_fps() {
        assert!(PlaybackSession::new(10, 0.0).is_err());
        assert!(PlaybackSession::new(10, -24.0).is_err());
        assert!(PlaybackSession::new(10, f64::NAN).is_err());

        let session = PlaybackSession::new(10, 24.0).unwrap();
        assert_eq!(session.status(), PlaybackStatus::Paused);
        assert_eq!(session.current_frame_index(), 0);
        assert_eq!(session.playback_rate(), 1.0);
    }

    #[test]
    fn test_first_playing_tick_starts_clock() {
        let mut session = playing(100, 24.0);
        assert_eq!(session.evaluate_tick(500), FrameChange::NoChange);
        assert_eq!(session.last_frame_displayed_at(), Some(500));
        assert_eq!(session.current_frame_index(), 0);
    }

    #[test]
    fn test_one_frame_interval_advances() {
        let start = time::from_seconds(10.0);
        let mut session = started(100, 24.0, start);

        let change = session.evaluate_tick(start + time::from_seconds(1.0 / 24.0));
        assert_eq!(change, FrameChange::Advance);
        assert_eq!(session.current_frame_index(), 1);
    }

    #[test]
    fn test_three_frame_intervals_seek() {
        let mut session = started(100, 24.0, 0);

        let change = session.evaluate_tick(time::from_seconds(3.0 / 24.0));
        assert_eq!(change, FrameChange::Seek);
        assert_eq!(session.current_frame_index(), 3);
    }

    #[test]
    fn test_partial_interval_is_no_change() {
        let mut session = started(100, 24.0, 0);

        let half_frame = time::from_seconds(0.5 / 24.0);
        assert_eq!(session.evaluate_tick(half_frame), FrameChange::NoChange);
        assert_eq!(session.current_frame_index(), 0);
        // Clock keeps running from the last shown frame, not the last tick
        assert_eq!(session.last_frame_displayed_at(), Some(0));
        assert_eq!(
            session.evaluate_tick(time::from_seconds(1.0 / 24.0)),
            FrameChange::Advance
        );
    }

    #[test]
    fn test_playback_rate_scales_advance() {
        let mut session = started(100, 24.0, 0);
        session.set_playback_rate(2.0);

        // One normal-speed interval covers two frames at 2x
        let change = session.evaluate_tick(time::from_seconds(1.0 / 24.0));
        assert_eq!(change, FrameChange::Seek);
        assert_eq!(session.current_frame_index(), 2);

        let mut slow = started(100, 24.0, 0);
        slow.set_playback_rate(0.5);
        assert_eq!(
            slow.evaluate_tick(time::from_seconds(1.0 / 24.0)),
            FrameChange::NoChange
        );
        assert_eq!(
            slow.evaluate_tick(time::from_seconds(2.0 / 24.0)),
            FrameChange::Advance
        );
    }

    #[test]
    fn test_zero_rate_becomes_normal_speed() {
        let mut session = PlaybackSession::new(10, 24.0).unwrap();
        session.set_playback_rate(0.0);
        assert_eq!(session.playback_rate(), 1.0);

        session.set_playback_rate(-3.0);
        assert_eq!(session.playback_rate(), 1.0);

        session.set_playback_rate(0.25);
        assert_eq!(session.playback_rate(), 0.25);
    }

    #[test]
    fn test_playing_clamps_at_end_then_pauses() {
        let mut session = started(5, 24.0, 0);

        let change = session.evaluate_tick(time::from_seconds(1.0));
        assert_eq!(change, FrameChange::Seek);
        assert_eq!(session.current_frame_index(), 5);
        assert_eq!(session.status(), PlaybackStatus::Playing);

        assert_eq!(session.evaluate_tick(time::from_seconds(2.0)), FrameChange::NoChange);
        assert_eq!(session.status(), PlaybackStatus::Paused);
        assert_eq!(session.current_frame_index(), 5);
    }

    #[test]
    fn test_paused_tick_is_no_change() {
        let mut session = started(100, 24.0, 0);
        session.evaluate_tick(time::from_seconds(1.0 / 24.0));
        session.toggle_play_pause();

        for step in 2..10 {
            let now = time::from_seconds(step as f64);
            assert_eq!(session.evaluate_tick(now), FrameChange::NoChange);
            assert_eq!(session.current_frame_index(), 1);
            assert_eq!(session.last_frame_displayed_at(), None);
        }
    }

    #[test]
    fn test_toggle_resume_restarts_clock() {
        let mut session = started(100, 24.0, 0);
        session.evaluate_tick(time::from_seconds(1.0 / 24.0));

        session.toggle_play_pause();
        session.toggle_play_pause();
        assert_eq!(session.status(), PlaybackStatus::Playing);

        // A long pause must not turn into a big jump on resume
        let resumed = time::from_seconds(60.0);
        assert_eq!(session.evaluate_tick(resumed), FrameChange::NoChange);
        assert_eq!(session.current_frame_index(), 1);
        assert_eq!(
            session.evaluate_tick(resumed + time::from_seconds(1.0 / 24.0)),
            FrameChange::Advance
        );
        assert_eq!(session.current_frame_index(), 2);
    }

    #[test]
    fn test_step_forward() {
        let mut session = PlaybackSession::new(3, 24.0).unwrap();
        session.request_step_forward();
        assert_eq!(session.evaluate_tick(0), FrameChange::Advance);
        assert_eq!(session.current_frame_index(), 1);
        assert_eq!(session.status(), PlaybackStatus::Paused);
    }

    #[test]
    fn test_step_forward_at_end() {
        let mut session = PlaybackSession::new(3, 24.0).unwrap();
        session.request_seek(3);
        session.evaluate_tick(0);

        session.request_step_forward();
        assert_eq!(session.evaluate_tick(1), FrameChange::NoChange);
        assert_eq!(session.current_frame_index(), 3);
        assert_eq!(session.status(), PlaybackStatus::Paused);
    }

    #[test]
    fn test_step_forward_while_playing_pauses() {
        let mut session = started(100, 24.0, 0);
        session.request_step_forward();
        assert_eq!(session.evaluate_tick(10), FrameChange::Advance);
        assert_eq!(session.status(), PlaybackStatus::Paused);
        assert_eq!(session.last_frame_displayed_at(), None);
    }

    #[test]
    fn test_step_backward() {
        let mut session = PlaybackSession::new(10, 24.0).unwrap();
        session.request_seek(4);
        session.evaluate_tick(0);

        session.request_step_backward();
        assert_eq!(session.evaluate_tick(1), FrameChange::Seek);
        assert_eq!(session.current_frame_index(), 3);
        assert_eq!(session.status(), PlaybackStatus::Paused);
    }

    #[test]
    fn test_step_backward_at_start() {
        let mut session = PlaybackSession::new(10, 24.0).unwrap();
        session.request_step_backward();
        assert_eq!(session.evaluate_tick(0), FrameChange::NoChange);
        assert_eq!(session.current_frame_index(), 0);
        assert_eq!(session.status(), PlaybackStatus::Paused);
    }

    #[test]
    fn test_seek_while_paused() {
        let mut session = PlaybackSession::new(100, 24.0).unwrap();
        session.request_seek(42);
        assert_eq!(session.status(), PlaybackStatus::SeekPending);
        assert_eq!(session.current_frame_index(), 42);

        assert_eq!(session.evaluate_tick(0), FrameChange::Seek);
        assert_eq!(session.status(), PlaybackStatus::Paused);
        assert_eq!(session.evaluate_tick(1), FrameChange::NoChange);
    }

    #[test]
    fn test_seek_is_clamped() {
        let mut session = PlaybackSession::new(100, 24.0).unwrap();
        session.request_seek(-5);
        assert_eq!(session.current_frame_index(), 0);
        session.request_seek(1_000);
        assert_eq!(session.current_frame_index(), 100);
        session.request_seek(i64::MAX);
        assert_eq!(session.current_frame_index(), 100);
    }

    #[test]
    fn test_seek_while_playing_resyncs() {
        let start = time::from_seconds(1.0);
        let mut session = started(1_000, 24.0, start);

        session.request_seek(500);
        assert_eq!(session.status(), PlaybackStatus::Playing);
        assert_eq!(session.current_frame_index(), 500);

        // Long after the last frame: reposition only, no stale skip
        let later = start + time::from_seconds(5.0);
        assert_eq!(session.evaluate_tick(later), FrameChange::Seek);
        assert_eq!(session.current_frame_index(), 500);

        assert_eq!(
            session.evaluate_tick(later + time::from_seconds(1.0 / 24.0)),
            FrameChange::Advance
        );
        assert_eq!(session.current_frame_index(), 501);
    }

    #[test]
    fn test_step_after_seek_while_playing_repositions() {
        let mut session = started(100, 24.0, 0);
        session.request_seek(40);
        session.request_step_forward();

        assert_eq!(session.evaluate_tick(1), FrameChange::Seek);
        assert_eq!(session.current_frame_index(), 41);
        assert_eq!(session.status(), PlaybackStatus::Paused);

        // Nothing outstanding afterwards
        session.request_step_forward();
        assert_eq!(session.evaluate_tick(2), FrameChange::Advance);
    }

    #[test]
    fn test_seek_during_pending_step_forward() {
        let mut session = PlaybackSession::new(100, 24.0).unwrap();
        session.request_step_forward();
        session.request_seek(50);
        assert_eq!(session.status(), PlaybackStatus::StepForward);

        assert_eq!(session.evaluate_tick(0), FrameChange::Seek);
        assert_eq!(session.current_frame_index(), 51);
        assert_eq!(session.status(), PlaybackStatus::Paused);

        session.request_step_forward();
        assert_eq!(session.evaluate_tick(1), FrameChange::Advance);
        assert_eq!(session.current_frame_index(), 52);
    }

    #[test]
    fn test_seek_during_pending_step_backward() {
        let mut session = PlaybackSession::new(100, 24.0).unwrap();
        session.request_step_backward();
        session.request_seek(50);

        assert_eq!(session.evaluate_tick(0), FrameChange::Seek);
        assert_eq!(session.current_frame_index(), 49);
    }

    #[test]
    fn test_toggle_from_seek_pending_keeps_seek() {
        let mut session = PlaybackSession::new(100, 24.0).unwrap();
        session.request_seek(10);
        session.toggle_play_pause();
        assert_eq!(session.status(), PlaybackStatus::Playing);
        assert_eq!(session.evaluate_tick(0), FrameChange::Seek);
        assert_eq!(session.current_frame_index(), 10);
    }

    #[test]
    fn test_stop_is_terminal_and_idempotent() {
        let mut session = started(100, 24.0, 0);
        assert!(session.stop());
        assert!(!session.stop());

        session.toggle_play_pause();
        session.request_step_forward();
        session.request_seek(50);
        assert_eq!(session.status(), PlaybackStatus::Stopped);
        assert_eq!(session.evaluate_tick(time::from_seconds(10.0)), FrameChange::NoChange);
        assert_eq!(session.current_frame_index(), 0);
    }

    #[test]
    fn test_index_stays_in_range() {
        let mut session = started(20, 30.0, 0);
        let mut now = 0;
        let ops: [fn(&mut PlaybackSession); 5] = [
            |s: &mut PlaybackSession| s.request_step_forward(),
            |s: &mut PlaybackSession| s.request_step_backward(),
            |s: &mut PlaybackSession| s.request_seek(-100),
            |s: &mut PlaybackSession| s.request_seek(100),
            |s: &mut PlaybackSession| s.toggle_play_pause(),
        ];

        for round in 0..200 {
            ops[round % ops.len()](&mut session);
            now += time::from_millis(37);
            session.evaluate_tick(now);
            assert!(session.current_frame_index() <= session.frame_count());
        }
    }

    #[test]
    fn test_end_of_stream_moves_to_end() {
        let mut session = started(100, 24.0, 0);
        session.mark_end_of_stream();
        assert_eq!(session.current_frame_index(), 100);
        assert_eq!(session.evaluate_tick(1), FrameChange::NoChange);
        assert!(session.status().is_paused());
    }
}
