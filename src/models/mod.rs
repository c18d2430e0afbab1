//! Data models for route weather computations
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic points and distances
//! - Waypoint: Route positions, arrival times and fetch outcomes
//! - Weather: Weather snapshots in the requested unit system
//! - Forecast: Time-ordered forecast series
//! - Route: The annotated route handed to the presentation layer

pub mod forecast;
pub mod location;
pub mod route;
pub mod waypoint;
pub mod weather;

// Re-export all public types for convenient access
pub use forecast::{ForecastEntry, ForecastSeries};
pub use location::GeoPoint;
pub use route::{RouteWeather, SavedRoute};
pub use waypoint::{AnnotatedWaypoint, FetchOutcome, TimedWaypoint, Waypoint, WaypointRole};
pub use weather::WeatherSnapshot;
