//! Choice between the instant observation and the periodic forecast.
//!
//! Arrival times within the forecast horizon take the forecast slot closest to the
//! arrival. Times already past, or beyond the horizon, fall back to the current
//! observation as the best available estimate.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use super::WeatherSource;
use crate::error::FetchError;
use crate::models::{ForecastEntry, GeoPoint, WeatherSnapshot};
use crate::units::UnitSystem;

pub const DEFAULT_FORECAST_HORIZON_HOURS: u32 = 120;

/// Which product of the weather source answers a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastProduct {
    /// Periodic forecast series, nearest slot
    Forecast,
    /// Instant observation
    Observation,
}

#[derive(Debug, Clone, Copy)]
pub struct HorizonSelector {
    horizon: TimeDelta,
}

impl Default for HorizonSelector {
    fn default() -> Self {
        Self::new(DEFAULT_FORECAST_HORIZON_HOURS)
    }
}

impl HorizonSelector {
    #[must_use]
    pub fn new(horizon_hours: u32) -> Self {
        Self {
            horizon: TimeDelta::hours(i64::from(horizon_hours)),
        }
    }

    /// Forecast for `0 <= target - now <= horizon`, observation otherwise
    #[must_use]
    pub fn choose(&self, target: DateTime<Utc>, now: DateTime<Utc>) -> ForecastProduct {
        let ahead = target - now;
        if ahead >= TimeDelta::zero() && ahead <= self.horizon {
            ForecastProduct::Forecast
        } else {
            ForecastProduct::Observation
        }
    }

    /// Weather expected at `point` at `target`
    pub async fn weather_at<S: WeatherSource>(
        &self,
        source: &S,
        point: &GeoPoint,
        target: DateTime<Utc>,
        now: DateTime<Utc>,
        units: UnitSystem,
    ) -> Result<WeatherSnapshot, FetchError> {
        match self.choose(target, now) {
            ForecastProduct::Forecast => {
                let series = source.forecast_series(point, units).await?;
                let entry = nearest_entry(series.entries(), target).ok_or(FetchError::EmptySeries)?;
                debug!(
                    "Forecast slot {} selected for arrival at {}",
                    entry.timestamp, target
                );
                Ok(entry.weather.clone())
            }
            ForecastProduct::Observation => {
                debug!("Arrival at {} outside forecast horizon, using observation", target);
                source.observe(point, units).await
            }
        }
    }
}

/// Entry of a time-ordered series closest to `target`; ties go to the earlier entry
#[must_use]
pub fn nearest_entry(entries: &[ForecastEntry], target: DateTime<Utc>) -> Option<&ForecastEntry> {
    let split = entries.partition_point(|entry| entry.timestamp < target);
    let before = split.checked_sub(1).and_then(|i| entries.get(i));
    let after = entries.get(split);

    match (before, after) {
        (Some(before), Some(after)) => {
            if target - before.timestamp <= after.timestamp - target {
                Some(before)
            } else {
                Some(after)
            }
        }
        (before, after) => before.or(after),
    }
}
