//! Route-level artifacts: the annotated route and its saved summary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AnnotatedWaypoint;
use crate::units::UnitSystem;

/// An annotated route plus the metadata the presentation layer shows with it
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RouteWeather {
    pub departure_name: String,
    pub arrival_name: String,
    pub departure_time: DateTime<Utc>,
    pub units: UnitSystem,
    /// "°C" or "°F"
    pub unit_symbol: String,
    pub straight_line_distance_km: f64,
    /// Ordered by sequence index, departure first
    pub waypoints: Vec<AnnotatedWaypoint>,
}

impl RouteWeather {
    #[must_use]
    pub fn succeeded_count(&self) -> usize {
        self.waypoints.iter().filter(|w| w.fetch_succeeded()).count()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.waypoints.len() - self.succeeded_count()
    }

    /// Whether at least one waypoint lacks weather
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.failed_count() > 0
    }

    /// Summary for the saved route store; `id` is assigned on save
    #[must_use]
    pub fn to_saved(&self, saved_at: DateTime<Utc>) -> SavedRoute {
        SavedRoute {
            id: 0,
            departure: self.departure_name.clone(),
            arrival: self.arrival_name.clone(),
            departure_time: self.departure_time,
            units: self.units,
            saved_at,
        }
    }
}

/// A route the user chose to keep
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SavedRoute {
    pub id: u64,
    pub departure: String,
    pub arrival: String,
    pub departure_time: DateTime<Utc>,
    pub units: UnitSystem,
    pub saved_at: DateTime<Utc>,
}
