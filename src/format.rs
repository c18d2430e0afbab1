//! Display formatting for weather values and annotated routes

use std::fmt::{self, Display};

use chrono::{DateTime, Utc};

use crate::models::{AnnotatedWaypoint, RouteWeather};
use crate::units::UnitSystem;

/// Round half up, without a negative zero
fn round_half_up(value: f64) -> f64 {
    let rounded = (value + 0.5).floor();
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Whole-degree temperature with its symbol, e.g. "21°C"
#[must_use]
pub fn format_temperature(temperature: f64, units: UnitSystem) -> String {
    format!(
        "{}{}",
        round_half_up(temperature),
        units.temperature_symbol()
    )
}

/// Whole wind speed with its unit, e.g. "18 km/h"
#[must_use]
pub fn format_wind_speed(speed: f64, units: UnitSystem) -> String {
    format!("{} {}", round_half_up(speed), units.wind_speed_label())
}

#[must_use]
pub fn format_humidity(humidity: u8) -> String {
    format!("{humidity}%")
}

/// Meters below one kilometer, otherwise kilometers with one decimal
#[must_use]
pub fn format_distance(distance_km: f64) -> String {
    if distance_km < 1.0 {
        format!("{} m", round_half_up(distance_km * 1000.0))
    } else {
        format!("{distance_km:.1} km")
    }
}

#[must_use]
pub fn format_time(time: DateTime<Utc>) -> String {
    time.format("%H:%M").to_string()
}

#[must_use]
pub fn format_date_time(time: DateTime<Utc>) -> String {
    time.format("%A %-d %B %Y, %H:%M UTC").to_string()
}

fn write_waypoint(
    f: &mut fmt::Formatter<'_>,
    waypoint: &AnnotatedWaypoint,
    route_len: usize,
    units: UnitSystem,
) -> fmt::Result {
    let position = waypoint.waypoint();
    writeln!(
        f,
        "{} {} ({}) · {}",
        format_time(waypoint.estimated_arrival()),
        position.display_name(),
        position.progress_label(route_len),
        position.point.format_coordinates()
    )?;

    match waypoint.weather() {
        Some(weather) => {
            writeln!(
                f,
                "   {} {}, {} (feels like {})",
                weather.emoji(),
                weather.format_description(),
                format_temperature(weather.temperature, units),
                format_temperature(weather.feels_like, units)
            )?;
            writeln!(
                f,
                "   💨 {}  💧 {}  🧭 {:.0} hPa",
                format_wind_speed(weather.wind_speed, units),
                format_humidity(weather.humidity),
                weather.pressure
            )
        }
        None => writeln!(
            f,
            "   ⚠️ Weather unavailable ({})",
            waypoint.failure_reason().unwrap_or("unknown error")
        ),
    }
}

impl Display for RouteWeather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "🚗 {} → {}", self.departure_name, self.arrival_name)?;
        writeln!(f, "   🕐 Departure: {}", format_date_time(self.departure_time))?;
        writeln!(
            f,
            "   📏 {} as the crow flies",
            format_distance(self.straight_line_distance_km)
        )?;
        if self.is_degraded() {
            writeln!(
                f,
                "   ⚠️ Weather unavailable for {} of {} waypoints",
                self.failed_count(),
                self.waypoints.len()
            )?;
        }
        writeln!(f)?;

        for waypoint in &self.waypoints {
            write_waypoint(f, waypoint, self.waypoints.len(), self.units)?;
        }
        Ok(())
    }
}
