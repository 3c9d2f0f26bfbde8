//! User input mapped onto playback commands.

pub mod keyboard;
pub mod scrub;

pub use keyboard::{command_for_key, parse_console_line, InputError};
pub use scrub::{FrameScrubBar, RateSlider};
