//! Unit system selection for weather queries and display

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Unit system requested from the weather source
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Celsius, km/h
    #[default]
    #[serde(alias = "celsius")]
    Metric,
    /// Fahrenheit, mph
    #[serde(alias = "fahrenheit")]
    Imperial,
}

impl UnitSystem {
    /// Map a Celsius/Fahrenheit toggle onto a unit system
    #[must_use]
    pub fn from_celsius_preference(is_celsius: bool) -> Self {
        if is_celsius {
            Self::Metric
        } else {
            Self::Imperial
        }
    }

    /// Map a stored preference code ("C" or "F"); anything else is metric
    #[must_use]
    pub fn from_preference_code(code: &str) -> Self {
        if code.trim().eq_ignore_ascii_case("f") {
            Self::Imperial
        } else {
            Self::Metric
        }
    }

    #[must_use]
    pub fn preference_code(self) -> &'static str {
        match self {
            Self::Metric => "C",
            Self::Imperial => "F",
        }
    }

    /// Value of the `units` query parameter
    #[must_use]
    pub fn query_token(self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }

    #[must_use]
    pub fn temperature_symbol(self) -> &'static str {
        match self {
            Self::Metric => "°C",
            Self::Imperial => "°F",
        }
    }

    #[must_use]
    pub fn wind_speed_label(self) -> &'static str {
        match self {
            Self::Metric => "km/h",
            Self::Imperial => "mph",
        }
    }
}

impl Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.query_token())
    }
}

impl FromStr for UnitSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metric" | "celsius" | "c" => Ok(Self::Metric),
            "imperial" | "fahrenheit" | "f" => Ok(Self::Imperial),
            other => Err(format!(
                "unknown unit system '{other}', expected metric or imperial"
            )),
        }
    }
}
