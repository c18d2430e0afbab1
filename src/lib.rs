//! `routecast` - Weather along a road trip, waypoint by waypoint
//!
//! This library places waypoints between a departure and an arrival, estimates
//! when each is reached, and looks up the weather expected there at that time.

pub mod config;
pub mod error;
pub mod format;
pub mod geocode;
pub mod http;
pub mod models;
pub mod orchestrator;
pub mod planner;
pub mod route;
pub mod storage;
pub mod telemetry;
pub mod units;
pub mod weather;

// Re-export core types for public API
pub use config::RoutecastConfig;
pub use error::{FetchError, RoutecastError};
pub use geocode::{Geocoder, NominatimGeocoder};
pub use models::{
    AnnotatedWaypoint, FetchOutcome, ForecastEntry, ForecastSeries, GeoPoint, RouteWeather,
    SavedRoute, TimedWaypoint, Waypoint, WaypointRole, WeatherSnapshot,
};
pub use orchestrator::fetch_route_weather;
pub use planner::{Generation, RouteGenerations, RoutePlanner, RouteRequest, RouteSettings};
pub use storage::RouteStore;
pub use units::UnitSystem;
pub use weather::{HorizonSelector, OpenWeatherMapClient, WeatherSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, RoutecastError>;
