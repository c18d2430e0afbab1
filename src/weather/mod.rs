//! Weather sources and forecast selection
//!
//! A [`WeatherSource`] offers two products for a coordinate: an instant observation
//! and a periodic forecast series (about five days in three-hour slots). The
//! [`horizon`] module decides which of the two answers a given arrival time.

use crate::error::FetchError;
use crate::models::{ForecastSeries, GeoPoint, WeatherSnapshot};
use crate::units::UnitSystem;

pub mod horizon;
pub mod openweathermap;

pub use horizon::{DEFAULT_FORECAST_HORIZON_HOURS, ForecastProduct, HorizonSelector, nearest_entry};
pub use openweathermap::OpenWeatherMapClient;

pub trait WeatherSource {
    /// Current conditions at `point`
    async fn observe(
        &self,
        point: &GeoPoint,
        units: UnitSystem,
    ) -> Result<WeatherSnapshot, FetchError>;

    /// Forecast series for `point`, sorted by timestamp
    async fn forecast_series(
        &self,
        point: &GeoPoint,
        units: UnitSystem,
    ) -> Result<ForecastSeries, FetchError>;
}
