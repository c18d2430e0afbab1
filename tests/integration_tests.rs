//! Integration tests for the route weather pipeline, driven through in-memory
//! geocoder and weather fakes

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use routecast::{
    FetchError, ForecastEntry, ForecastSeries, GeoPoint, Geocoder, RoutePlanner, RouteRequest,
    RouteSettings, RoutecastError, UnitSystem, WaypointRole, WeatherSnapshot, WeatherSource,
};

fn departure_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-10-20T08:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn weather(temperature: f64, icon_code: &str, at: DateTime<Utc>) -> WeatherSnapshot {
    WeatherSnapshot {
        observed_at: at,
        temperature,
        feels_like: temperature,
        description: "ciel dégagé".to_string(),
        icon_code: icon_code.to_string(),
        humidity: 55,
        wind_speed: 12.0,
        pressure: 1016.0,
        visibility: Some(10_000),
        clouds: Some(5),
    }
}

#[derive(Default)]
struct FakeGeocoder {
    places: HashMap<String, GeoPoint>,
    broken: bool,
    reverse_name: Option<String>,
}

impl FakeGeocoder {
    fn morocco() -> Self {
        let places = [
            ("Casablanca", 33.5731, -7.5898),
            ("Tangier", 35.7595, -5.8337),
            ("Rabat", 34.0209, -6.8416),
            ("Fes", 34.0181, -5.0078),
        ]
        .into_iter()
        .map(|(name, lat, lon)| (name.to_string(), GeoPoint::named(lat, lon, name).unwrap()))
        .collect();
        Self {
            places,
            ..Self::default()
        }
    }
}

impl Geocoder for FakeGeocoder {
    async fn resolve(&self, place: &str) -> Result<Option<GeoPoint>, FetchError> {
        if self.broken {
            return Err(FetchError::Status {
                status: 503,
                message: "Service Unavailable".into(),
            });
        }
        Ok(self.places.get(place).cloned())
    }

    async fn name_at(&self, _point: &GeoPoint) -> Result<Option<String>, FetchError> {
        match &self.reverse_name {
            Some(name) => Ok(Some(name.clone())),
            None => Err(FetchError::InvalidResponse("no address".into())),
        }
    }
}

/// Deterministic source: forecast slots every 3 hours from `now` with
/// temperature = slot number; observations report the point's latitude.
struct FakeWeather {
    now: DateTime<Utc>,
    failing: Vec<String>,
    slow: Vec<String>,
    lookups: Arc<AtomicUsize>,
}

impl FakeWeather {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            failing: Vec::new(),
            slow: Vec::new(),
            lookups: Arc::default(),
        }
    }

    /// Shared count of weather requests, readable after the planner takes the source
    fn lookup_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.lookups)
    }

    fn failing_at(mut self, names: &[&str]) -> Self {
        self.failing = names.iter().map(|n| n.to_string()).collect();
        self
    }

    async fn lookup(&self, point: &GeoPoint) -> Result<(), FetchError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let name = point.name.clone().unwrap_or_default();
        if self.slow.contains(&name) {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        if self.failing.contains(&name) {
            return Err(FetchError::Status {
                status: 502,
                message: "Bad Gateway".into(),
            });
        }
        Ok(())
    }
}

impl WeatherSource for FakeWeather {
    async fn observe(
        &self,
        point: &GeoPoint,
        _units: UnitSystem,
    ) -> Result<WeatherSnapshot, FetchError> {
        self.lookup(point).await?;
        Ok(weather(point.latitude, "01d", self.now))
    }

    async fn forecast_series(
        &self,
        point: &GeoPoint,
        _units: UnitSystem,
    ) -> Result<ForecastSeries, FetchError> {
        self.lookup(point).await?;
        let entries = (0..40)
            .map(|slot| {
                let timestamp = self.now + TimeDelta::hours(3 * slot);
                ForecastEntry {
                    timestamp,
                    weather: weather(slot as f64, "02d", timestamp),
                }
            })
            .collect();
        Ok(ForecastSeries::new(entries))
    }
}

fn request(from: &str, to: &str) -> RouteRequest {
    RouteRequest {
        from: from.to_string(),
        to: to.to_string(),
        departure: departure_time(),
        units: UnitSystem::Metric,
        stops: None,
    }
}

#[tokio::test]
async fn test_casablanca_to_tangier_scenario() {
    let planner = RoutePlanner::new(
        FakeGeocoder::morocco(),
        FakeWeather::new(departure_time()),
        RouteSettings::default(),
    );

    let route = planner
        .plan_at(&request("Casablanca", "Tangier"), departure_time())
        .await
        .unwrap();

    assert_eq!(route.departure_name, "Casablanca");
    assert_eq!(route.arrival_name, "Tangier");
    assert_eq!(route.unit_symbol, "°C");
    assert!(route.straight_line_distance_km > 280.0 && route.straight_line_distance_km < 300.0);
    assert_eq!(route.waypoints.len(), 5);

    let (dep_lat, dep_lon) = (33.5731, -7.5898);
    let (arr_lat, arr_lon) = (35.7595, -5.8337);
    for (index, waypoint) in route.waypoints.iter().enumerate() {
        assert_eq!(waypoint.sequence_index(), index);
        assert_eq!(
            waypoint.estimated_arrival(),
            departure_time() + TimeDelta::hours(index as i64)
        );
        assert!(waypoint.fetch_succeeded());

        let fraction = index as f64 / 4.0;
        let point = &waypoint.waypoint().point;
        assert!((point.latitude - (dep_lat + (arr_lat - dep_lat) * fraction)).abs() < 1e-9);
        assert!((point.longitude - (dep_lon + (arr_lon - dep_lon) * fraction)).abs() < 1e-9);
    }

    let roles: Vec<WaypointRole> = route.waypoints.iter().map(|w| w.waypoint().role).collect();
    assert_eq!(
        roles,
        vec![
            WaypointRole::Departure,
            WaypointRole::Intermediate,
            WaypointRole::Intermediate,
            WaypointRole::Intermediate,
            WaypointRole::Arrival,
        ]
    );

    let names: Vec<String> = route.waypoints.iter().map(|w| w.waypoint().display_name()).collect();
    assert_eq!(
        names,
        vec!["Casablanca", "Waypoint 1", "Waypoint 2", "Waypoint 3", "Tangier"]
    );

    // Nearest 3-hour slot to T, T+1h .. T+4h
    let temperatures: Vec<f64> = route
        .waypoints
        .iter()
        .map(|w| w.weather().unwrap().temperature)
        .collect();
    assert_eq!(temperatures, vec![0.0, 0.0, 1.0, 1.0, 1.0]);
}

#[tokio::test]
async fn test_one_failed_waypoint_keeps_the_route() {
    let planner = RoutePlanner::new(
        FakeGeocoder::morocco(),
        FakeWeather::new(departure_time()).failing_at(&["Waypoint 2"]),
        RouteSettings::default(),
    );

    let route = planner
        .plan_at(&request("Casablanca", "Tangier"), departure_time())
        .await
        .unwrap();

    assert_eq!(route.waypoints.len(), 5);
    let succeeded: Vec<bool> = route.waypoints.iter().map(|w| w.fetch_succeeded()).collect();
    assert_eq!(succeeded, vec![true, true, false, true, true]);
    assert!(route.waypoints[2].weather().is_none());
    assert!(route.waypoints[2].failure_reason().unwrap().contains("502"));
    assert_eq!(route.failed_count(), 1);
}

#[tokio::test]
async fn test_all_failed_waypoints_is_a_route_error() {
    let planner = RoutePlanner::new(
        FakeGeocoder::morocco(),
        FakeWeather::new(departure_time()).failing_at(&[
            "Casablanca",
            "Waypoint 1",
            "Waypoint 2",
            "Waypoint 3",
            "Tangier",
        ]),
        RouteSettings::default(),
    );

    let err = planner
        .plan_at(&request("Casablanca", "Tangier"), departure_time())
        .await
        .unwrap_err();

    match err {
        RoutecastError::AllPointsFailed { reasons } => assert_eq!(reasons.len(), 5),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_zero_stops_gives_departure_and_arrival_only() {
    let planner = RoutePlanner::new(
        FakeGeocoder::morocco(),
        FakeWeather::new(departure_time()),
        RouteSettings::default(),
    );
    let mut req = request("Casablanca", "Tangier");
    req.stops = Some(0);

    let route = planner.plan_at(&req, departure_time()).await.unwrap();

    let roles: Vec<WaypointRole> = route.waypoints.iter().map(|w| w.waypoint().role).collect();
    assert_eq!(roles, vec![WaypointRole::Departure, WaypointRole::Arrival]);
    assert_eq!(
        route.waypoints[1].estimated_arrival(),
        departure_time() + TimeDelta::hours(1)
    );
}

#[tokio::test]
async fn test_unknown_place_is_unresolved() {
    let weather = FakeWeather::new(departure_time());
    let lookups = weather.lookup_counter();
    let planner = RoutePlanner::new(FakeGeocoder::morocco(), weather, RouteSettings::default());

    let err = planner
        .plan_at(&request("Casablanca", "Atlantis"), departure_time())
        .await
        .unwrap_err();

    assert!(matches!(err, RoutecastError::EndpointUnresolved { ref place } if place == "Atlantis"));
    assert!(!err.is_retryable());
    assert_eq!(lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_out_of_range_endpoint_is_malformed_before_any_lookup() {
    let mut geocoder = FakeGeocoder::morocco();
    geocoder.places.insert(
        "Nowhere".to_string(),
        GeoPoint {
            latitude: 95.0,
            longitude: -7.0,
            name: Some("Nowhere".to_string()),
        },
    );
    let weather = FakeWeather::new(departure_time());
    let lookups = weather.lookup_counter();
    let planner = RoutePlanner::new(geocoder, weather, RouteSettings::default());

    let err = planner
        .plan_at(&request("Casablanca", "Nowhere"), departure_time())
        .await
        .unwrap_err();

    // Arrival after three intermediates
    assert!(matches!(err, RoutecastError::MalformedPoint { ordinal: 4, .. }));
    assert_eq!(lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_too_many_stops_is_rejected_before_any_lookup() {
    let weather = FakeWeather::new(departure_time());
    let lookups = weather.lookup_counter();
    let planner = RoutePlanner::new(FakeGeocoder::morocco(), weather, RouteSettings::default());

    for stops in [routecast::route::MAX_INTERMEDIATE_COUNT + 1, 5000, usize::MAX] {
        let mut req = request("Casablanca", "Tangier");
        req.stops = Some(stops);

        let err = planner.plan_at(&req, departure_time()).await.unwrap_err();
        assert!(matches!(err, RoutecastError::Config { .. }), "stops = {stops}");
    }
    assert_eq!(lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_stops_at_the_limit_are_accepted() {
    let weather = FakeWeather::new(departure_time());
    let lookups = weather.lookup_counter();
    let planner = RoutePlanner::new(FakeGeocoder::morocco(), weather, RouteSettings::default());
    let mut req = request("Casablanca", "Tangier");
    req.stops = Some(routecast::route::MAX_INTERMEDIATE_COUNT);

    let route = planner.plan_at(&req, departure_time()).await.unwrap();

    assert_eq!(route.waypoints.len(), routecast::route::MAX_INTERMEDIATE_COUNT + 2);
    assert_eq!(lookups.load(Ordering::SeqCst), route.waypoints.len());
}

#[tokio::test]
async fn test_geocoder_outage_is_fatal() {
    let geocoder = FakeGeocoder {
        broken: true,
        ..FakeGeocoder::morocco()
    };
    let planner = RoutePlanner::new(
        geocoder,
        FakeWeather::new(departure_time()),
        RouteSettings::default(),
    );

    let err = planner
        .plan_at(&request("Casablanca", "Tangier"), departure_time())
        .await
        .unwrap_err();

    assert!(matches!(err, RoutecastError::Geocoding { .. }));
}

#[tokio::test]
async fn test_pipeline_is_idempotent() {
    let planner = RoutePlanner::new(
        FakeGeocoder::morocco(),
        FakeWeather::new(departure_time()).failing_at(&["Waypoint 1"]),
        RouteSettings::default(),
    );
    let req = request("Rabat", "Fes");

    let first = planner.plan_at(&req, departure_time()).await.unwrap();
    let second = planner.plan_at(&req, departure_time()).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_departure_beyond_horizon_uses_observations() {
    let planner = RoutePlanner::new(
        FakeGeocoder::morocco(),
        FakeWeather::new(departure_time()),
        RouteSettings::default(),
    );
    let mut req = request("Rabat", "Fes");
    req.departure = departure_time() + TimeDelta::days(10);
    req.units = UnitSystem::Imperial;

    let route = planner.plan_at(&req, departure_time()).await.unwrap();

    assert_eq!(route.unit_symbol, "°F");
    assert!(
        route
            .waypoints
            .iter()
            .all(|w| w.weather().unwrap().icon_code == "01d")
    );
}

#[tokio::test]
async fn test_reverse_geocoded_names() {
    let geocoder = FakeGeocoder {
        reverse_name: Some("Kénitra".to_string()),
        ..FakeGeocoder::morocco()
    };
    let settings = RouteSettings {
        name_waypoints: true,
        intermediate_count: 1,
        ..RouteSettings::default()
    };
    let planner = RoutePlanner::new(geocoder, FakeWeather::new(departure_time()), settings);

    let route = planner
        .plan_at(&request("Casablanca", "Tangier"), departure_time())
        .await
        .unwrap();

    let names: Vec<String> = route.waypoints.iter().map(|w| w.waypoint().display_name()).collect();
    assert_eq!(names, vec!["Casablanca", "Kénitra", "Tangier"]);
}

#[tokio::test]
async fn test_failed_reverse_geocoding_falls_back_to_label() {
    let settings = RouteSettings {
        name_waypoints: true,
        intermediate_count: 2,
        ..RouteSettings::default()
    };
    let planner = RoutePlanner::new(
        FakeGeocoder::morocco(),
        FakeWeather::new(departure_time()),
        settings,
    );

    let route = planner
        .plan_at(&request("Casablanca", "Tangier"), departure_time())
        .await
        .unwrap();

    assert_eq!(route.waypoints[1].waypoint().display_name(), "Waypoint 1");
    assert_eq!(route.waypoints[2].waypoint().display_name(), "Waypoint 2");
}

#[tokio::test(start_paused = true)]
async fn test_superseded_computation_is_discarded() {
    let mut weather = FakeWeather::new(Utc::now());
    weather.slow = vec!["Casablanca".to_string()];
    let planner = RoutePlanner::new(FakeGeocoder::morocco(), weather, RouteSettings::default());

    let stale = request("Casablanca", "Tangier");
    let fresh = request("Rabat", "Fes");
    let (stale_result, fresh_result) =
        tokio::join!(planner.plan_latest(&stale), planner.plan_latest(&fresh));

    assert!(stale_result.unwrap().is_none());
    let fresh_route = fresh_result.unwrap().unwrap();
    assert_eq!(fresh_route.departure_name, "Rabat");
}
