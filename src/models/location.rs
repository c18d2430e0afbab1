//! Geographic point model

use haversine::{Location as HaversineLocation, Units, distance};
use serde::{Deserialize, Serialize};

use crate::error::RoutecastError;

/// A geographic point, optionally named
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeoPoint {
    /// Latitude in decimal degrees (-90..=90)
    pub latitude: f64,
    /// Longitude in decimal degrees (-180..=180)
    pub longitude: f64,
    /// Display name (city, reverse-geocoded label, ...)
    pub name: Option<String>,
}

impl GeoPoint {
    /// Create a point after checking the coordinate ranges
    pub fn new(latitude: f64, longitude: f64, name: Option<String>) -> crate::Result<Self> {
        if !Self::is_valid_coordinate(latitude, longitude) {
            return Err(RoutecastError::malformed_point(
                0,
                format!("coordinates out of range: {latitude}, {longitude}"),
            ));
        }
        Ok(Self {
            latitude,
            longitude,
            name,
        })
    }

    /// Create a named point after checking the coordinate ranges
    pub fn named<S: Into<String>>(latitude: f64, longitude: f64, name: S) -> crate::Result<Self> {
        Self::new(latitude, longitude, Some(name.into()))
    }

    #[must_use]
    pub fn is_valid_coordinate(latitude: f64, longitude: f64) -> bool {
        latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude)
    }

    /// Format point as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// Name of the point, or its coordinates when unnamed
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.format_coordinates())
    }

    /// Great-circle distance to another point in kilometers
    #[must_use]
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let from = HaversineLocation {
            latitude: self.latitude,
            longitude: self.longitude,
        };
        let to = HaversineLocation {
            latitude: other.latitude,
            longitude: other.longitude,
        };
        distance(from, to, Units::Kilometers)
    }
}
