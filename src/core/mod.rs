//! Core types shared across the crate.
//! All time values are in nanoseconds (i64).

pub mod time;

pub use time::Time;
