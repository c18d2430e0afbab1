//! Canonical point shape for points coming from different producers.
//!
//! Geocoder results, interpolated points and hand-written JSON use different field
//! names (`latitude`/`lat`, `longitude`/`lon`/`lng`) and sometimes carry
//! coordinates as strings. Everything downstream only sees [`GeoPoint`].

use serde::{Deserialize, Serialize};

use crate::error::RoutecastError;
use crate::models::GeoPoint;

/// A coordinate as a number or as text
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Coordinate {
    Number(f64),
    Text(String),
}

impl Coordinate {
    fn parse(&self) -> Option<f64> {
        let value = match self {
            Coordinate::Number(value) => *value,
            Coordinate::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for Coordinate {
    fn from(value: f64) -> Self {
        Coordinate::Number(value)
    }
}

impl From<&str> for Coordinate {
    fn from(value: &str) -> Self {
        Coordinate::Text(value.to_string())
    }
}

/// A point as some producer shaped it
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct RawPoint {
    #[serde(alias = "lat", default)]
    pub latitude: Option<Coordinate>,
    #[serde(alias = "lon", alias = "lng", default)]
    pub longitude: Option<Coordinate>,
    #[serde(alias = "label", default)]
    pub name: Option<String>,
}

impl RawPoint {
    pub fn new(
        latitude: impl Into<Coordinate>,
        longitude: impl Into<Coordinate>,
        name: Option<String>,
    ) -> Self {
        Self {
            latitude: Some(latitude.into()),
            longitude: Some(longitude.into()),
            name,
        }
    }
}

impl From<GeoPoint> for RawPoint {
    fn from(point: GeoPoint) -> Self {
        RawPoint::new(point.latitude, point.longitude, point.name)
    }
}

/// Ordinal label for a point without a name
#[must_use]
pub fn ordinal_label(ordinal: usize) -> String {
    format!("Waypoint {ordinal}")
}

/// Normalize one point; `ordinal` names it when it has no name of its own
pub fn normalize(raw: &RawPoint, ordinal: usize) -> crate::Result<GeoPoint> {
    let latitude = parse_axis(raw.latitude.as_ref(), "latitude", ordinal)?;
    let longitude = parse_axis(raw.longitude.as_ref(), "longitude", ordinal)?;

    if !GeoPoint::is_valid_coordinate(latitude, longitude) {
        return Err(RoutecastError::malformed_point(
            ordinal,
            format!("coordinates out of range: {latitude}, {longitude}"),
        ));
    }

    let name = raw
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map_or_else(|| ordinal_label(ordinal), str::to_string);

    Ok(GeoPoint {
        latitude,
        longitude,
        name: Some(name),
    })
}

/// Normalize a whole route; the first malformed point aborts
pub fn normalize_all(raw: &[RawPoint]) -> crate::Result<Vec<GeoPoint>> {
    raw.iter()
        .enumerate()
        .map(|(ordinal, point)| normalize(point, ordinal))
        .collect()
}

fn parse_axis(value: Option<&Coordinate>, axis: &str, ordinal: usize) -> crate::Result<f64> {
    let value = value
        .ok_or_else(|| RoutecastError::malformed_point(ordinal, format!("missing {axis}")))?;
    value.parse().ok_or_else(|| {
        RoutecastError::malformed_point(ordinal, format!("{axis} is not a number: {value:?}"))
    })
}
