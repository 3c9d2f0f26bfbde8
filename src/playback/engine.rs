//! Host timer loop driving a video player.
//! Ticks on a fixed period and applies commands from a crossbeam channel.

use std::time::Duration;
use crossbeam::channel::{self, Receiver};
use crate::decode::source::VideoSource;
use crate::playback::clock::Clock;
use crate::playback::player::{PlayerError, VideoPlayer};
use crate::playback::state::FrameChange;

/// Command sent to playback engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackCommand {
    TogglePlayPause,
    StepForward,
    StepBackward,
    Seek(i64),     // frame index, clamped by the session
    SetRate(f64),  // speed multiplier
    Stop,
}

/// Main playback engine
pub struct PlaybackEngine<S: VideoSource, C: Clock> {
    player: VideoPlayer<S>,
    clock: C,
    tick_interval: Duration,
}

impl<S: VideoSource, C: Clock> PlaybackEngine<S, C> {
    pub fn new(player: VideoPlayer<S>, clock: C, tick_interval: Duration) -> Self {
        Self {
            player,
            clock,
            tick_interval,
        }
    }

    pub fn player(&self) -> &VideoPlayer<S> {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut VideoPlayer<S> {
        &mut self.player
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Process a playback command
    pub fn process_command(&mut self, command: PlaybackCommand) {
        log::debug!("Command {:?}", command);
        if command == PlaybackCommand::Stop {
            self.player.stop();
            return;
        }

        let session = self.player.session_mut();
        match command {
            PlaybackCommand::TogglePlayPause => session.toggle_play_pause(),
            PlaybackCommand::StepForward => session.request_step_forward(),
            PlaybackCommand::StepBackward => session.request_step_backward(),
            PlaybackCommand::Seek(target) => session.request_seek(target),
            PlaybackCommand::SetRate(multiplier) => session.set_playback_rate(multiplier),
            PlaybackCommand::Stop => {}
        }
    }

    /// Run one timer tick at the clock's current time
    pub fn tick(&mut self) -> Result<FrameChange, PlayerError> {
        let now = self.clock.now();
        self.player.tick(now)
    }

    /// Tick until stopped.
    ///
    /// Ends on a `Stop` command, when every command sender has been dropped
    /// (the host went away), or on the first source error. The source is
    /// released in every case.
    pub fn run(&mut self, commands: &Receiver<PlaybackCommand>) -> Result<(), PlayerError> {
        let ticker = channel::tick(self.tick_interval);
        log::info!("Playback loop started, ticking every {:?}", self.tick_interval);

        let result = self.run_loop(commands, &ticker);
        self.player.stop();
        result
    }

    fn run_loop(
        &mut self,
        commands: &Receiver<PlaybackCommand>,
        ticker: &Receiver<std::time::Instant>,
    ) -> Result<(), PlayerError> {
        while !self.player.is_stopped() {
            channel::select! {
                recv(commands) -> command => match command {
                    Ok(command) => self.process_command(command),
                    Err(_) => {
                        log::info!("Command channel closed, stopping");
                        return Ok(());
                    }
                },
                recv(ticker) -> _ => {
                    if let Err(e) = self.tick() {
                        log::warn!("Playback failed at frame {}: {}", self.player.current_frame_index(), e);
                        return Err(e);
                    }
                },
            }
        }
        Ok(())
    }
}

impl<S: VideoSource, C: Clock> Drop for PlaybackEngine<S, C> {
    fn drop(&mut self) {
        self.player.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;
    use crate::core::time;
    use crate::decode::memory::MemorySource;
    use crate::playback::clock::{ManualClock, MonotonicClock};
    use crate::playback::state::PlaybackStatus;

    fn engine<C: Clock>(source: MemorySource, clock: C) -> PlaybackEngine<MemorySource, C> {
        let player = VideoPlayer::new(source, &PlayerConfig::default(), |_| {}).unwrap();
        PlaybackEngine::new(player, clock, Duration::from_millis(1))
    }

    #[test]
    fn test_process_commands() {
        let mut engine = engine(MemorySource::new(100, 24.0), ManualClock::new(0));

        engine.process_command(PlaybackCommand::TogglePlayPause);
        assert_eq!(engine.player().status(), PlaybackStatus::Paused);

        engine.process_command(PlaybackCommand::SetRate(0.0));
        assert_eq!(engine.player().session().playback_rate(), 1.0);

        engine.process_command(PlaybackCommand::Seek(250));
        assert_eq!(engine.player().status(), PlaybackStatus::SeekPending);
        assert_eq!(engine.player().current_frame_index(), 100);

        engine.process_command(PlaybackCommand::StepBackward);
        assert_eq!(engine.player().status(), PlaybackStatus::StepBackward);
    }

    #[test]
    fn test_ticks_follow_clock() {
        let mut engine = engine(MemorySource::new(100, 24.0), ManualClock::new(0));

        assert_eq!(engine.tick().unwrap(), FrameChange::NoChange);
        engine.clock().advance(time::from_seconds(1.0 / 24.0));
        assert_eq!(engine.tick().unwrap(), FrameChange::Advance);
        engine.clock().advance(time::from_seconds(2.0 / 24.0));
        assert_eq!(engine.tick().unwrap(), FrameChange::Seek);
        assert_eq!(engine.player().current_frame_index(), 3);
    }

    #[test]
    fn test_stop_command_ends_run() {
        let source = MemorySource::new(100, 24.0);
        let stats = source.stats();
        let mut engine = engine(source, MonotonicClock::new());

        let (tx, rx) = channel::unbounded();
        tx.send(PlaybackCommand::Stop).unwrap();
        engine.run(&rx).unwrap();

        assert!(engine.player().is_stopped());
        assert_eq!(stats.releases(), 1);
        drop(engine);
        assert_eq!(stats.releases(), 1);
    }

    #[test]
    fn test_closed_channel_stops() {
        let source = MemorySource::new(100, 24.0);
        let stats = source.stats();
        let mut engine = engine(source, MonotonicClock::new());

        let (tx, rx) = channel::unbounded::<PlaybackCommand>();
        drop(tx);
        engine.run(&rx).unwrap();

        assert!(engine.player().is_stopped());
        assert_eq!(stats.releases(), 1);
    }

    #[test]
    fn test_source_error_ends_run_and_releases() {
        let source = MemorySource::new(100, 24.0).with_failing_seeks();
        let stats = source.stats();
        let mut engine = engine(source, MonotonicClock::new());

        let (tx, rx) = channel::unbounded();
        tx.send(PlaybackCommand::Seek(10)).unwrap();
        // Keep the sender alive so only the failing seek can end the loop
        let result = engine.run(&rx);
        drop(tx);

        assert!(matches!(result, Err(PlayerError::Decode(_))));
        assert_eq!(stats.releases(), 1);
    }
}
