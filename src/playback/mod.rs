pub mod clock;
pub mod engine;
pub mod player;
pub mod session;
pub mod state;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use engine::{PlaybackCommand, PlaybackEngine};
pub use player::{PlayerError, Position, VideoPlayer};
pub use session::{PlaybackSession, SessionError};
pub use state::{FrameChange, PlaybackStatus};
