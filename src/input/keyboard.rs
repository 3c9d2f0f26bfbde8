//! Keyboard and console input mapped onto playback commands.

use crate::input::scrub::RateSlider;
use crate::playback::engine::PlaybackCommand;

pub const KEY_ESCAPE: i32 = 27;
pub const KEY_SPACE: i32 = 32;
pub const KEY_PREV_FRAME: i32 = b'a' as i32;
pub const KEY_NEXT_FRAME: i32 = b'd' as i32;

/// Command bound to a key code, if any
pub fn command_for_key(code: i32) -> Option<PlaybackCommand> {
    match code {
        KEY_ESCAPE => Some(PlaybackCommand::Stop),
        KEY_SPACE => Some(PlaybackCommand::TogglePlayPause),
        KEY_PREV_FRAME => Some(PlaybackCommand::StepBackward),
        KEY_NEXT_FRAME => Some(PlaybackCommand::StepForward),
        _ => None,
    }
}

/// Error type for console lines that don't parse
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Unknown command: {0}")]
    Unknown(String),
    #[error("Missing argument for {0}")]
    MissingArgument(&'static str),
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
}

/// Parse one line typed on the console.
///
/// Accepts the single keys bound by [`command_for_key`], `space`/`play`/`pause`,
/// `q`/`quit`/`esc`, `seek <frame>` and `rate <percent>`. A blank line is
/// `Ok(None)`.
pub fn parse_console_line(line: &str) -> Result<Option<PlaybackCommand>, InputError> {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Ok(None);
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "space" | "play" | "pause" | "p" => PlaybackCommand::TogglePlayPause,
        "q" | "quit" | "esc" | "stop" => PlaybackCommand::Stop,
        "seek" | "s" => {
            let arg = words.next().ok_or(InputError::MissingArgument("seek"))?;
            let frame = arg
                .parse::<i64>()
                .map_err(|_| InputError::InvalidNumber(arg.to_string()))?;
            PlaybackCommand::Seek(frame)
        }
        "rate" | "r" => {
            let arg = words.next().ok_or(InputError::MissingArgument("rate"))?;
            let percent = arg
                .parse::<u32>()
                .map_err(|_| InputError::InvalidNumber(arg.to_string()))?;
            RateSlider::command(percent)
        }
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() => {
                    command_for_key(c as i32).ok_or_else(|| InputError::Unknown(other.to_string()))?
                }
                _ => return Err(InputError::Unknown(other.to_string())),
            }
        }
    };

    Ok(Some(command))
}
