//! Concurrent weather lookups for every waypoint of a route.
//!
//! Lookups run independently with a bounded number in flight. A failed lookup is
//! recorded on its own waypoint and never cancels the others; the result keeps the
//! input order.

use chrono::{DateTime, Utc};
use futures::{StreamExt, stream};
use tracing::{info, warn};

use crate::models::{AnnotatedWaypoint, TimedWaypoint};
use crate::units::UnitSystem;
use crate::weather::{HorizonSelector, WeatherSource};

/// Annotate each waypoint with the weather expected at its arrival time
pub async fn fetch_route_weather<S: WeatherSource>(
    source: &S,
    selector: &HorizonSelector,
    waypoints: Vec<TimedWaypoint>,
    units: UnitSystem,
    now: DateTime<Utc>,
    max_concurrency: usize,
) -> Vec<AnnotatedWaypoint> {
    let total = waypoints.len();

    let annotated: Vec<AnnotatedWaypoint> = stream::iter(waypoints)
        .map(|timed| async move {
            let result = selector
                .weather_at(
                    source,
                    &timed.waypoint.point,
                    timed.estimated_arrival,
                    now,
                    units,
                )
                .await;
            match result {
                Ok(weather) => AnnotatedWaypoint::succeeded(timed, weather),
                Err(e) => {
                    warn!(
                        "Weather lookup failed for waypoint {} ({}): {}",
                        timed.waypoint.sequence_index,
                        timed.waypoint.display_name(),
                        e
                    );
                    AnnotatedWaypoint::failed(timed, e.to_string())
                }
            }
        })
        .buffered(max_concurrency.max(1))
        .collect()
        .await;

    let succeeded = annotated.iter().filter(|w| w.fetch_succeeded()).count();
    info!("Weather available for {}/{} waypoints", succeeded, total);
    annotated
}
