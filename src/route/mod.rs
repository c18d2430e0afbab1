//! Route construction: where the waypoints are and when they are reached
//!
//! Waypoints are placed by straight-line interpolation between the endpoints and
//! reached at a fixed duration per segment. There is no road-network routing.

pub mod interpolate;
pub mod normalize;
pub mod schedule;

pub use interpolate::{interpolate, interpolate_between, interpolation_fractions};
pub use normalize::{Coordinate, RawPoint, normalize, normalize_all};
pub use schedule::{DEFAULT_SECONDS_PER_SEGMENT, MAX_INTERMEDIATE_COUNT, estimate_arrivals};
