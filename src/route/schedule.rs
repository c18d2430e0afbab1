//! Arrival time estimation with a constant duration per segment.

use chrono::{DateTime, TimeDelta, Utc};

use crate::models::{TimedWaypoint, Waypoint};

pub const DEFAULT_SECONDS_PER_SEGMENT: u32 = 3600;

/// Upper bound on intermediate waypoints per route, one weather lookup each
pub const MAX_INTERMEDIATE_COUNT: usize = 50;

/// Stamp each waypoint with `departure + sequence_index * seconds_per_segment`
#[must_use]
pub fn estimate_arrivals(
    departure: DateTime<Utc>,
    waypoints: Vec<Waypoint>,
    seconds_per_segment: u32,
) -> Vec<TimedWaypoint> {
    waypoints
        .into_iter()
        .map(|waypoint| {
            let offset = i64::try_from(waypoint.sequence_index)
                .ok()
                .and_then(|index| index.checked_mul(i64::from(seconds_per_segment)))
                .and_then(TimeDelta::try_seconds);
            let estimated_arrival = offset
                .and_then(|offset| departure.checked_add_signed(offset))
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            TimedWaypoint {
                waypoint,
                estimated_arrival,
            }
        })
        .collect()
}
