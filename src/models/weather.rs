//! Weather snapshot model and display methods

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Weather at one place and time, in the unit system it was requested in
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Observation time, or the forecast slot this snapshot describes
    pub observed_at: DateTime<Utc>,
    /// Temperature in °C (metric) or °F (imperial)
    pub temperature: f64,
    /// Apparent temperature, same unit as `temperature`
    pub feels_like: f64,
    /// Human-readable description of weather conditions
    pub description: String,
    /// Weather condition icon code from the API (e.g. "10d")
    pub icon_code: String,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Wind speed in km/h (metric) or mph (imperial)
    pub wind_speed: f64,
    /// Atmospheric pressure in hPa
    pub pressure: f64,
    /// Visibility in meters
    pub visibility: Option<u32>,
    /// Cloud cover percentage (0-100)
    pub clouds: Option<u8>,
}

impl WeatherSnapshot {
    /// URL of the condition icon image
    #[must_use]
    pub fn icon_url(&self) -> String {
        format!("{ICON_BASE_URL}/{}@2x.png", self.icon_code)
    }

    /// Emoji for the condition icon code
    #[must_use]
    pub fn emoji(&self) -> &'static str {
        match self.icon_code.get(..2) {
            Some("01") => "☀️",
            Some("02") => "⛅",
            Some("03") | Some("04") => "☁️",
            Some("09") => "🌧️",
            Some("10") => "🌦️",
            Some("11") => "⛈️",
            Some("13") => "❄️",
            Some("50") => "🌫️",
            _ => "🌤️",
        }
    }

    /// Description with its first letter capitalized
    #[must_use]
    pub fn format_description(&self) -> String {
        let mut chars = self.description.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}
