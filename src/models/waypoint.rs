//! Waypoint models: position in the route, arrival time and weather outcome

use super::{GeoPoint, WeatherSnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a waypoint within its route
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WaypointRole {
    Departure,
    Intermediate,
    Arrival,
}

/// A point of the route with its role and position
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Waypoint {
    pub point: GeoPoint,
    pub role: WaypointRole,
    /// Position in the route, departure is 0
    pub sequence_index: usize,
}

impl Waypoint {
    /// Assemble departure, intermediates and arrival into an indexed route
    #[must_use]
    pub fn sequence(
        departure: GeoPoint,
        intermediates: Vec<GeoPoint>,
        arrival: GeoPoint,
    ) -> Vec<Waypoint> {
        let last = intermediates.len() + 1;
        let mut route = Vec::with_capacity(last + 1);

        route.push(Waypoint {
            point: departure,
            role: WaypointRole::Departure,
            sequence_index: 0,
        });
        route.extend(
            intermediates
                .into_iter()
                .enumerate()
                .map(|(i, point)| Waypoint {
                    point,
                    role: WaypointRole::Intermediate,
                    sequence_index: i + 1,
                }),
        );
        route.push(Waypoint {
            point: arrival,
            role: WaypointRole::Arrival,
            sequence_index: last,
        });
        route
    }

    /// Where along the route this waypoint sits, e.g. "50% of route"
    #[must_use]
    pub fn progress_label(&self, route_len: usize) -> String {
        match self.role {
            WaypointRole::Departure => "Departure".to_string(),
            WaypointRole::Arrival => "Arrival".to_string(),
            WaypointRole::Intermediate => {
                let span = route_len.saturating_sub(1).max(1) as f64;
                let percent = (self.sequence_index as f64 / span * 100.0).round();
                format!("{percent}% of route")
            }
        }
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        self.point.display_name()
    }
}

/// A waypoint with its estimated arrival time
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TimedWaypoint {
    pub waypoint: Waypoint,
    pub estimated_arrival: DateTime<Utc>,
}

/// Result of the weather lookup for one waypoint
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
    Succeeded { weather: WeatherSnapshot },
    Failed { reason: String },
}

/// Final artifact of the pipeline: a timed waypoint and its weather, if any
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnnotatedWaypoint {
    pub timed: TimedWaypoint,
    pub outcome: FetchOutcome,
}

impl AnnotatedWaypoint {
    #[must_use]
    pub fn succeeded(timed: TimedWaypoint, weather: WeatherSnapshot) -> Self {
        Self {
            timed,
            outcome: FetchOutcome::Succeeded { weather },
        }
    }

    #[must_use]
    pub fn failed<S: Into<String>>(timed: TimedWaypoint, reason: S) -> Self {
        Self {
            timed,
            outcome: FetchOutcome::Failed {
                reason: reason.into(),
            },
        }
    }

    #[must_use]
    pub fn weather(&self) -> Option<&WeatherSnapshot> {
        match &self.outcome {
            FetchOutcome::Succeeded { weather } => Some(weather),
            FetchOutcome::Failed { .. } => None,
        }
    }

    #[must_use]
    pub fn fetch_succeeded(&self) -> bool {
        matches!(self.outcome, FetchOutcome::Succeeded { .. })
    }

    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        match &self.outcome {
            FetchOutcome::Succeeded { .. } => None,
            FetchOutcome::Failed { reason } => Some(reason),
        }
    }

    #[must_use]
    pub fn waypoint(&self) -> &Waypoint {
        &self.timed.waypoint
    }

    #[must_use]
    pub fn sequence_index(&self) -> usize {
        self.timed.waypoint.sequence_index
    }

    #[must_use]
    pub fn estimated_arrival(&self) -> DateTime<Utc> {
        self.timed.estimated_arrival
    }
}
