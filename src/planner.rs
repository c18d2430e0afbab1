//! Route weather planning
//!
//! Runs the whole pipeline for one request: resolve the endpoints, place and name
//! the waypoints, estimate arrivals, then fetch weather for every waypoint.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::config::RoutecastConfig;
use crate::error::RoutecastError;
use crate::geocode::Geocoder;
use crate::models::{GeoPoint, RouteWeather, Waypoint};
use crate::orchestrator::fetch_route_weather;
use crate::route::{
    MAX_INTERMEDIATE_COUNT, RawPoint, estimate_arrivals, interpolate, normalize_all,
};
use crate::units::UnitSystem;
use crate::weather::{HorizonSelector, WeatherSource};

/// Pipeline parameters, usually taken from [`RoutecastConfig`]
#[derive(Debug, Clone)]
pub struct RouteSettings {
    pub intermediate_count: usize,
    pub seconds_per_segment: u32,
    pub max_concurrent_fetches: usize,
    pub forecast_horizon_hours: u32,
    /// Reverse geocode intermediate waypoints
    pub name_waypoints: bool,
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self::from_config(&RoutecastConfig::default())
    }
}

impl RouteSettings {
    #[must_use]
    pub fn from_config(config: &RoutecastConfig) -> Self {
        Self {
            intermediate_count: config.route.intermediate_count,
            seconds_per_segment: config.route.seconds_per_segment,
            max_concurrent_fetches: config.route.max_concurrent_fetches,
            forecast_horizon_hours: config.weather.forecast_horizon_hours,
            name_waypoints: config.geocoding.name_waypoints,
        }
    }
}

/// One route weather request
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub from: String,
    pub to: String,
    pub departure: DateTime<Utc>,
    pub units: UnitSystem,
    /// Overrides the configured intermediate count
    pub stops: Option<usize>,
}

/// Token identifying one computation started through [`RouteGenerations::begin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

/// Generation counter used to discard results of superseded computations.
/// Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct RouteGenerations {
    latest: Arc<AtomicU64>,
}

impl RouteGenerations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a computation; every earlier token becomes stale
    pub fn begin(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[must_use]
    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest.load(Ordering::SeqCst) == generation.0
    }

    /// `Some(value)` if no newer computation began since `generation`
    pub fn accept<T>(&self, generation: Generation, value: T) -> Option<T> {
        if self.is_current(generation) {
            Some(value)
        } else {
            debug!("Discarding result of superseded computation {}", generation.0);
            None
        }
    }
}

pub struct RoutePlanner<G, W> {
    geocoder: G,
    weather: W,
    settings: RouteSettings,
    selector: HorizonSelector,
    generations: RouteGenerations,
}

impl<G: Geocoder, W: WeatherSource> RoutePlanner<G, W> {
    pub fn new(geocoder: G, weather: W, settings: RouteSettings) -> Self {
        let selector = HorizonSelector::new(settings.forecast_horizon_hours);
        Self {
            geocoder,
            weather,
            settings,
            selector,
            generations: RouteGenerations::new(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &RouteSettings {
        &self.settings
    }

    #[must_use]
    pub fn generations(&self) -> &RouteGenerations {
        &self.generations
    }

    /// Compute the annotated route for `request`, relative to the current time
    pub async fn plan(&self, request: &RouteRequest) -> crate::Result<RouteWeather> {
        self.plan_at(request, Utc::now()).await
    }

    /// Like [`Self::plan`], but `Ok(None)` when a newer computation started meanwhile
    pub async fn plan_latest(&self, request: &RouteRequest) -> crate::Result<Option<RouteWeather>> {
        let generation = self.generations.begin();
        match self.plan(request).await {
            Ok(route) => Ok(self.generations.accept(generation, route)),
            Err(e) if self.generations.is_current(generation) => Err(e),
            Err(e) => {
                debug!("Superseded computation failed: {}", e);
                Ok(None)
            }
        }
    }

    /// Compute the annotated route for `request` with an explicit "now"
    #[instrument(skip(self, request), fields(from = %request.from, to = %request.to))]
    pub async fn plan_at(
        &self,
        request: &RouteRequest,
        now: DateTime<Utc>,
    ) -> crate::Result<RouteWeather> {
        let count = check_intermediate_count(
            request.stops.unwrap_or(self.settings.intermediate_count),
        )?;
        let departure = self.resolve_endpoint(&request.from).await?;
        let arrival = self.resolve_endpoint(&request.to).await?;

        self.plan_between(departure, arrival, request.departure, request.units, count, now)
            .await
    }

    /// Compute the annotated route between two resolved endpoints
    pub async fn plan_between(
        &self,
        departure: GeoPoint,
        arrival: GeoPoint,
        departure_time: DateTime<Utc>,
        units: UnitSystem,
        intermediate_count: usize,
        now: DateTime<Utc>,
    ) -> crate::Result<RouteWeather> {
        let start = Instant::now();
        let intermediate_count = check_intermediate_count(intermediate_count)?;

        let mut intermediates = interpolate(&departure, &arrival, intermediate_count);
        if self.settings.name_waypoints {
            self.name_intermediates(&mut intermediates).await;
        }

        let raw: Vec<RawPoint> = std::iter::once(departure)
            .chain(intermediates)
            .chain(std::iter::once(arrival))
            .map(RawPoint::from)
            .collect();
        let mut points = normalize_all(&raw)?.into_iter();
        let (Some(departure), Some(arrival)) = (points.next(), points.next_back()) else {
            return Err(RoutecastError::malformed_point(
                0,
                "route needs a departure and an arrival",
            ));
        };
        let intermediates: Vec<GeoPoint> = points.collect();

        let departure_name = departure.display_name();
        let arrival_name = arrival.display_name();
        let distance = departure.distance_km(&arrival);
        debug!(
            "Route {} -> {}: {:.1} km, {} intermediate waypoints",
            departure_name,
            arrival_name,
            distance,
            intermediates.len()
        );

        let waypoints = Waypoint::sequence(departure, intermediates, arrival);
        let timed = estimate_arrivals(departure_time, waypoints, self.settings.seconds_per_segment);
        let annotated = fetch_route_weather(
            &self.weather,
            &self.selector,
            timed,
            units,
            now,
            self.settings.max_concurrent_fetches,
        )
        .await;

        if annotated.iter().all(|w| !w.fetch_succeeded()) {
            let reasons = annotated
                .iter()
                .filter_map(|w| w.failure_reason().map(str::to_string))
                .collect();
            return Err(RoutecastError::AllPointsFailed { reasons });
        }

        info!(
            "Route weather for {} -> {} computed in {:?}",
            departure_name,
            arrival_name,
            start.elapsed()
        );

        Ok(RouteWeather {
            departure_name,
            arrival_name,
            departure_time,
            units,
            unit_symbol: units.temperature_symbol().to_string(),
            straight_line_distance_km: distance,
            waypoints: annotated,
        })
    }

    async fn resolve_endpoint(&self, place: &str) -> crate::Result<GeoPoint> {
        let place = place.trim();
        if place.is_empty() {
            return Err(RoutecastError::endpoint_unresolved(place));
        }
        match self.geocoder.resolve(place).await {
            Ok(Some(point)) => Ok(point),
            Ok(None) => Err(RoutecastError::endpoint_unresolved(place)),
            Err(source) => Err(RoutecastError::Geocoding {
                place: place.to_string(),
                source,
            }),
        }
    }

    /// Best effort; points keep no name when the lookup fails
    async fn name_intermediates(&self, points: &mut [GeoPoint]) {
        for point in points.iter_mut() {
            match self.geocoder.name_at(point).await {
                Ok(Some(name)) => point.name = Some(name),
                Ok(None) => {}
                Err(e) => debug!(
                    "Reverse geocoding failed for {}: {}",
                    point.format_coordinates(),
                    e
                ),
            }
        }
    }
}

fn check_intermediate_count(count: usize) -> crate::Result<usize> {
    if count > MAX_INTERMEDIATE_COUNT {
        return Err(RoutecastError::config(format!(
            "Intermediate waypoint count cannot exceed {MAX_INTERMEDIATE_COUNT} (got {count})"
        )));
    }
    Ok(count)
}
