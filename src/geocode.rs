//! Place name resolution
//!
//! Turns the user's departure and arrival text into coordinates, and optionally
//! names intermediate waypoints via reverse geocoding.

use tracing::{debug, instrument};

use crate::config::GeocodingConfig;
use crate::error::{FetchError, RoutecastError};
use crate::http::{build_client, check_status};
use crate::models::GeoPoint;
use reqwest_middleware::ClientWithMiddleware;

pub trait Geocoder {
    /// Best match for `place`, `None` when nothing matches
    async fn resolve(&self, place: &str) -> Result<Option<GeoPoint>, FetchError>;

    /// Display name for the place at `point`, `None` when unknown
    async fn name_at(&self, point: &GeoPoint) -> Result<Option<String>, FetchError>;
}

/// Geocoder backed by the OpenStreetMap Nominatim API
pub struct NominatimGeocoder {
    client: ClientWithMiddleware,
    base_url: String,
}

#[derive(Debug, serde::Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

/// First comma-separated segment of a Nominatim display name
fn short_name(display_name: &str) -> Option<String> {
    display_name
        .split(',')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl NominatimGeocoder {
    pub fn new(config: &GeocodingConfig) -> crate::Result<Self> {
        let client = build_client(config.timeout_seconds, 0, &config.user_agent)
            .map_err(|e| RoutecastError::config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl Geocoder for NominatimGeocoder {
    #[instrument(skip(self))]
    async fn resolve(&self, place: &str) -> Result<Option<GeoPoint>, FetchError> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            urlencoding::encode(place)
        );
        let response = check_status(self.client.get(&url).send().await?).await?;
        let places: Vec<NominatimPlace> = response.json().await?;

        let Some(found) = places.into_iter().next() else {
            debug!("No geocoding result for '{}'", place);
            return Ok(None);
        };

        let parse = |value: &str, field: &str| {
            value.trim().parse::<f64>().map_err(|_| {
                FetchError::InvalidResponse(format!("{field} '{value}' is not a number"))
            })
        };
        let latitude = parse(&found.lat, "lat")?;
        let longitude = parse(&found.lon, "lon")?;
        let name = found
            .display_name
            .as_deref()
            .and_then(short_name)
            .unwrap_or_else(|| place.to_string());

        let point = GeoPoint::named(latitude, longitude, name)
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;
        debug!(
            "Resolved '{}' to {} ({})",
            place,
            point.display_name(),
            point.format_coordinates()
        );
        Ok(Some(point))
    }

    #[instrument(skip(self, point), fields(lat = point.latitude, lon = point.longitude))]
    async fn name_at(&self, point: &GeoPoint) -> Result<Option<String>, FetchError> {
        let url = format!(
            "{}/reverse?lat={}&lon={}&format=json",
            self.base_url, point.latitude, point.longitude
        );
        let response = check_status(self.client.get(&url).send().await?).await?;
        let place: serde_json::Value = response.json().await?;
        Ok(place
            .get("display_name")
            .and_then(serde_json::Value::as_str)
            .and_then(short_name))
    }
}
