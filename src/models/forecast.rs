//! Forecast series model

use super::WeatherSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One slot of a periodic forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastEntry {
    /// Time the slot is valid for
    pub timestamp: DateTime<Utc>,
    /// Forecast weather for the slot
    pub weather: WeatherSnapshot,
}

/// Periodic forecast for one coordinate, sorted by timestamp
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ForecastSeries {
    entries: Vec<ForecastEntry>,
}

impl ForecastSeries {
    /// Create a series; entries are sorted by timestamp
    #[must_use]
    pub fn new(mut entries: Vec<ForecastEntry>) -> Self {
        entries.sort_by_key(|entry| entry.timestamp);
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[ForecastEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Time span covered by the series
    #[must_use]
    pub fn coverage(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.entries.first()?.timestamp, self.entries.last()?.timestamp))
    }
}
