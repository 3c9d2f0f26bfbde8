//! Time series drawn alongside the video, with the cursor at the current
//! video timestamp.

use std::path::{Path, PathBuf};

/// Error type for series loading
#[derive(Debug, thiserror::Error)]
pub enum SeriesError {
    #[error("Failed to read series {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse series: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Series point {0} has a non-finite timestamp")]
    InvalidTimestamp(usize),
}

/// One (timestamp, value) sample; timestamp in seconds of video time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub timestamp: f64,
    pub value: f64,
}

/// Samples sorted by timestamp
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    points: Vec<SeriesPoint>,
}

impl Series {
    pub fn new(points: impl IntoIterator<Item = (f64, f64)>) -> Result<Self, SeriesError> {
        let mut points: Vec<SeriesPoint> = points
            .into_iter()
            .map(|(timestamp, value)| SeriesPoint { timestamp, value })
            .collect();

        if let Some(bad) = points.iter().position(|p| !p.timestamp.is_finite()) {
            return Err(SeriesError::InvalidTimestamp(bad));
        }
        points.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

        Ok(Self { points })
    }

    /// Parse `[[timestamp, value], ...]`
    pub fn from_json_str(text: &str) -> Result<Self, SeriesError> {
        let raw: Vec<(f64, f64)> = serde_json::from_str(text)?;
        Self::new(raw)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SeriesError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SeriesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let series = Self::from_json_str(&text)?;
        log::info!("Loaded {} points from {:?}", series.len(), path);
        Ok(series)
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Value of the last sample at or before `timestamp` (step interpolation)
    pub fn value_at(&self, timestamp: f64) -> Option<f64> {
        let after = self.points.partition_point(|p| p.timestamp <= timestamp);
        after.checked_sub(1).map(|i| self.points[i].value)
    }

    /// Samples as (x, y) with x relative to the cursor at `timestamp`
    pub fn shifted(&self, timestamp: f64) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|p| (p.timestamp - timestamp, p.value))
            .collect()
    }

    /// Shifted samples within `half_window` seconds of the cursor
    pub fn visible(&self, timestamp: f64, half_window: f64) -> Vec<(f64, f64)> {
        let start = self.points.partition_point(|p| p.timestamp < timestamp - half_window);
        let end = self.points.partition_point(|p| p.timestamp <= timestamp + half_window);
        self.points[start..end.max(start)]
            .iter()
            .map(|p| (p.timestamp - timestamp, p.value))
            .collect()
    }
}
