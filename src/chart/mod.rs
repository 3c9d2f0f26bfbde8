//! Chart data kept in step with the video position.

pub mod series;

pub use series::{Series, SeriesError, SeriesPoint};
