//! Evenly spaced intermediate points between two endpoints.
//!
//! Interpolation is planar in latitude/longitude, not along the great circle. For the
//! short and medium trips this is meant for the difference is small; long routes will
//! drift from the geodesic.

use crate::models::GeoPoint;

/// Fractions of the way from departure to arrival for `count` intermediate points
pub fn interpolation_fractions(count: usize) -> impl Iterator<Item = f64> {
    let divisions = count as f64 + 1.0;
    (1..=count).map(move |i| i as f64 / divisions)
}

/// `count` points strictly between `departure` and `arrival`, in travel order.
/// Points are unnamed.
#[must_use]
pub fn interpolate(departure: &GeoPoint, arrival: &GeoPoint, count: usize) -> Vec<GeoPoint> {
    let d_lat = arrival.latitude - departure.latitude;
    let d_lon = arrival.longitude - departure.longitude;

    interpolation_fractions(count)
        .map(|fraction| GeoPoint {
            latitude: departure.latitude + d_lat * fraction,
            longitude: departure.longitude + d_lon * fraction,
            name: None,
        })
        .collect()
}

/// Like [`interpolate`], but a missing endpoint yields no points
#[must_use]
pub fn interpolate_between(
    departure: Option<&GeoPoint>,
    arrival: Option<&GeoPoint>,
    count: usize,
) -> Vec<GeoPoint> {
    match (departure, arrival) {
        (Some(departure), Some(arrival)) => interpolate(departure, arrival, count),
        _ => Vec::new(),
    }
}
