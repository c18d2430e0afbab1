//! OpenWeatherMap client for the current-weather and 5-day/3-hour forecast endpoints

use std::time::Instant;

use chrono::{DateTime, Utc};
use reqwest_middleware::ClientWithMiddleware;
use tracing::{debug, info, instrument, warn};

use super::WeatherSource;
use crate::config::WeatherConfig;
use crate::error::{FetchError, RoutecastError};
use crate::http::{USER_AGENT, build_client, check_status};
use crate::models::{ForecastEntry, ForecastSeries, GeoPoint, WeatherSnapshot};
use crate::units::UnitSystem;

/// Casablanca, queried to check whether an API key is accepted
const KEY_CHECK_POINT: (f64, f64) = (33.5731, -7.5898);

/// m/s to km/h
const MPS_TO_KMH: f64 = 3.6;

pub struct OpenWeatherMapClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
    language: String,
}

impl OpenWeatherMapClient {
    /// Create a new client; fails when no API key is configured
    pub fn new(config: &WeatherConfig) -> crate::Result<Self> {
        let api_key = config.require_api_key()?.to_string();

        let client = build_client(config.timeout_seconds, config.max_retries, USER_AGENT)
            .map_err(|e| RoutecastError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            language: config.language.clone(),
        })
    }

    fn endpoint_url(&self, endpoint: &str, latitude: f64, longitude: f64, units: UnitSystem) -> String {
        format!(
            "{}/{endpoint}?lat={latitude}&lon={longitude}&units={}&lang={}&appid={}",
            self.base_url,
            units.query_token(),
            urlencoding::encode(&self.language),
            urlencoding::encode(&self.api_key),
        )
    }

    async fn fetch_current(
        &self,
        latitude: f64,
        longitude: f64,
        units: UnitSystem,
    ) -> Result<WeatherSnapshot, FetchError> {
        let url = self.endpoint_url("weather", latitude, longitude, units);
        let response = check_status(self.client.get(&url).send().await?).await?;
        let body: owm::Current = response.json().await?;
        body.into_snapshot(units)
    }

    /// Whether the configured key is accepted, checked with a current-weather call
    #[instrument(skip(self))]
    pub async fn validate_api_key(&self) -> bool {
        let (latitude, longitude) = KEY_CHECK_POINT;
        match self.fetch_current(latitude, longitude, UnitSystem::Metric).await {
            Ok(_) => true,
            Err(e) => {
                warn!("API key validation failed: {}", e);
                false
            }
        }
    }
}

impl WeatherSource for OpenWeatherMapClient {
    #[instrument(skip(self, point), fields(lat = point.latitude, lon = point.longitude))]
    async fn observe(
        &self,
        point: &GeoPoint,
        units: UnitSystem,
    ) -> Result<WeatherSnapshot, FetchError> {
        let start = Instant::now();
        let snapshot = self
            .fetch_current(point.latitude, point.longitude, units)
            .await?;
        debug!("Current weather fetched in {:?}", start.elapsed());
        Ok(snapshot)
    }

    #[instrument(skip(self, point), fields(lat = point.latitude, lon = point.longitude))]
    async fn forecast_series(
        &self,
        point: &GeoPoint,
        units: UnitSystem,
    ) -> Result<ForecastSeries, FetchError> {
        let start = Instant::now();
        let url = self.endpoint_url("forecast", point.latitude, point.longitude, units);
        let response = check_status(self.client.get(&url).send().await?).await?;
        let body: owm::Forecast = response.json().await?;

        let entries = body
            .list
            .into_iter()
            .map(|slot| {
                let timestamp = slot.timestamp()?;
                Ok(ForecastEntry {
                    timestamp,
                    weather: slot.into_snapshot(units)?,
                })
            })
            .collect::<Result<Vec<_>, FetchError>>()?;

        info!(
            "Fetched {} forecast slots in {:?}",
            entries.len(),
            start.elapsed()
        );
        Ok(ForecastSeries::new(entries))
    }
}

/// Response shapes of the OpenWeatherMap 2.5 API
mod owm {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct Main {
        pub temp: f64,
        pub feels_like: f64,
        pub pressure: f64,
        pub humidity: u8,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        pub description: String,
        pub icon: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Wind {
        pub speed: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct Clouds {
        pub all: u8,
    }

    /// `/weather` response, also the shape of each `/forecast` list slot
    #[derive(Debug, Deserialize)]
    pub struct Current {
        pub dt: i64,
        pub main: Main,
        #[serde(default)]
        pub weather: Vec<Condition>,
        pub wind: Option<Wind>,
        pub visibility: Option<u32>,
        pub clouds: Option<Clouds>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Forecast {
        #[serde(default)]
        pub list: Vec<Current>,
    }

    impl Current {
        pub fn timestamp(&self) -> Result<DateTime<Utc>, FetchError> {
            DateTime::from_timestamp(self.dt, 0)
                .ok_or_else(|| FetchError::InvalidResponse(format!("timestamp {} out of range", self.dt)))
        }

        pub fn into_snapshot(self, units: UnitSystem) -> Result<WeatherSnapshot, FetchError> {
            let observed_at = self.timestamp()?;
            let condition = self.weather.into_iter().next().ok_or_else(|| {
                FetchError::InvalidResponse("response has no weather condition".to_string())
            })?;
            let raw_wind = self.wind.map_or(0.0, |w| w.speed);
            let wind_speed = match units {
                UnitSystem::Metric => raw_wind * MPS_TO_KMH,
                UnitSystem::Imperial => raw_wind,
            };

            Ok(WeatherSnapshot {
                observed_at,
                temperature: self.main.temp,
                feels_like: self.main.feels_like,
                description: condition.description,
                icon_code: condition.icon,
                humidity: self.main.humidity,
                wind_speed,
                pressure: self.main.pressure,
                visibility: self.visibility,
                clouds: self.clouds.map(|c| c.all),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> WeatherConfig {
        WeatherConfig {
            api_key: Some("test_api_key_123".to_string()),
            base_url: server.uri(),
            ..WeatherConfig::default()
        }
    }

    fn current_body(dt: i64, temp: f64, wind: f64) -> serde_json::Value {
        json!({
            "dt": dt,
            "main": {"temp": temp, "feels_like": temp - 1.5, "pressure": 1013, "humidity": 72},
            "weather": [{"description": "ciel dégagé", "icon": "01d"}],
            "wind": {"speed": wind},
            "visibility": 10000,
            "clouds": {"all": 0}
        })
    }

    fn casablanca() -> GeoPoint {
        GeoPoint::named(33.5731, -7.5898, "Casablanca").unwrap()
    }

    #[test]
    fn test_new_requires_api_key() {
        let result = OpenWeatherMapClient::new(&WeatherConfig::default());
        assert!(matches!(result, Err(RoutecastError::Config { .. })));

        let empty = WeatherConfig {
            api_key: Some(String::new()),
            ..WeatherConfig::default()
        };
        assert!(matches!(
            OpenWeatherMapClient::new(&empty),
            Err(RoutecastError::Config { .. })
        ));
    }

    #[tokio::test]
    async fn test_observe_converts_metric_wind_to_kmh() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("units", "metric"))
            .and(query_param("lang", "fr"))
            .and(query_param("appid", "test_api_key_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body(1_760_000_000, 21.5, 5.0)))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenWeatherMapClient::new(&config_for(&server)).unwrap();
        let snapshot = client.observe(&casablanca(), UnitSystem::Metric).await.unwrap();

        assert_eq!(snapshot.temperature, 21.5);
        assert!((snapshot.wind_speed - 18.0).abs() < 1e-9);
        assert_eq!(snapshot.humidity, 72);
        assert_eq!(snapshot.icon_code, "01d");
        assert_eq!(snapshot.clouds, Some(0));
        assert_eq!(snapshot.observed_at.timestamp(), 1_760_000_000);
    }

    #[tokio::test]
    async fn test_observe_keeps_imperial_wind() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("units", "imperial"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body(1_760_000_000, 70.7, 11.2)))
            .mount(&server)
            .await;

        let client = OpenWeatherMapClient::new(&config_for(&server)).unwrap();
        let snapshot = client.observe(&casablanca(), UnitSystem::Imperial).await.unwrap();
        assert!((snapshot.wind_speed - 11.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_forecast_series_is_sorted() {
        let server = MockServer::start().await;
        let body = json!({
            "list": [
                current_body(1_760_010_800, 19.0, 3.0),
                current_body(1_760_000_000, 21.0, 4.0),
                current_body(1_760_021_600, 17.0, 2.0),
            ]
        });
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = OpenWeatherMapClient::new(&config_for(&server)).unwrap();
        let series = client
            .forecast_series(&casablanca(), UnitSystem::Metric)
            .await
            .unwrap();

        let stamps: Vec<i64> = series.entries().iter().map(|e| e.timestamp.timestamp()).collect();
        assert_eq!(stamps, vec![1_760_000_000, 1_760_010_800, 1_760_021_600]);
        assert_eq!(series.entries()[0].weather.temperature, 21.0);
    }

    #[tokio::test]
    async fn test_error_status_carries_api_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "cod": 401,
                "message": "Invalid API key"
            })))
            .mount(&server)
            .await;

        let client = OpenWeatherMapClient::new(&config_for(&server)).unwrap();
        let err = client.observe(&casablanca(), UnitSystem::Metric).await.unwrap_err();
        match err {
            FetchError::Status { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API key");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!client.validate_api_key().await);
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"dt": 1})))
            .mount(&server)
            .await;

        let client = OpenWeatherMapClient::new(&config_for(&server)).unwrap();
        let err = client.observe(&casablanca(), UnitSystem::Metric).await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_validate_api_key_queries_casablanca() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("lat", "33.5731"))
            .and(query_param("lon", "-7.5898"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body(1_760_000_000, 22.0, 1.0)))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenWeatherMapClient::new(&config_for(&server)).unwrap();
        assert!(client.validate_api_key().await);
    }
}
