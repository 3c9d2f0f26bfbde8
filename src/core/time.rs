//! Time representation for playback accounting.
//! All wall-clock and media times are nanoseconds (i64).

/// Time in nanoseconds on a monotonic clock or from the start of a video
pub type Time = i64;

/// Time constants for conversions
pub mod constants {
    use super::Time;

    pub const NANOS_PER_SECOND: Time = 1_000_000_000;
    pub const NANOS_PER_MILLI: Time = 1_000_000;
}

/// Convert seconds (f64) to nanoseconds (i64)
#[inline]
pub fn from_seconds(seconds: f64) -> Time {
    (seconds * constants::NANOS_PER_SECOND as f64) as Time
}

/// Convert nanoseconds (i64) to seconds (f64)
#[inline]
pub fn to_seconds(nanos: Time) -> f64 {
    nanos as f64 / constants::NANOS_PER_SECOND as f64
}

/// Convert milliseconds to nanoseconds
#[inline]
pub fn from_millis(millis: i64) -> Time {
    millis * constants::NANOS_PER_MILLI
}

/// Convert nanoseconds to milliseconds
#[inline]
pub fn to_millis(nanos: Time) -> i64 {
    nanos / constants::NANOS_PER_MILLI
}

/// Timestamp (seconds) at which a frame is presented
#[inline]
pub fn frame_to_seconds(frame_index: u64, fps: f64) -> f64 {
    frame_index as f64 / fps
}

/// Convert frame index to time given a frame rate
#[inline]
pub fn from_frame_index(frame_index: u64, fps: f64) -> Time {
    from_seconds(frame_to_seconds(frame_index, fps))
}

/// Duration of one displayed frame in nanoseconds at the given rate multiplier
#[inline]
pub fn frame_interval(fps: f64, rate: f64) -> f64 {
    constants::NANOS_PER_SECOND as f64 / (fps * rate)
}

/// Format time as HH:MM:SS.mmm
pub fn format_time(nanos: Time) -> String {
    let total_seconds = to_seconds(nanos);
    let hours = (total_seconds / 3600.0).floor() as i64;
    let minutes = ((total_seconds % 3600.0) / 60.0).floor() as i64;
    let seconds = (total_seconds % 60.0).floor() as i64;
    let millis = to_millis(nanos) % 1000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}
