//! Geofence evaluation: great-circle distance against a site radius.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters, as used by the haversine formula.
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Acceptance radius applied when a point of sale has none configured.
pub const DEFAULT_PDV_RADIUS_METERS: f64 = 100.0;

/// A WGS84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl Coordinates {
    /// Creates a coordinate pair.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Outcome of a GPS capture persisted with a completed task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsResult {
    /// Submitted latitude.
    pub latitude: f64,
    /// Submitted longitude.
    pub longitude: f64,
    /// Whether the submission fell inside the site's acceptance radius.
    pub in_range: bool,
}

/// Computes the haversine great-circle distance between two coordinates, in
/// meters.
///
/// Non-finite inputs produce a non-finite distance, which
/// [`within_radius`] classifies as out of range rather than panicking.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "geodesic distance requires floating-point trigonometry"
)]
pub fn distance_meters(a: Coordinates, b: Coordinates) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let half_chord = (delta_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (delta_lon / 2.0).sin().powi(2);
    let angular_distance = 2.0 * half_chord.sqrt().atan2((1.0 - half_chord).sqrt());

    EARTH_RADIUS_METERS * angular_distance
}

/// Returns `true` when `distance` falls within `radius`, both in meters.
///
/// Any non-finite operand (NaN propagated from malformed coordinates,
/// infinities) evaluates to out of range.
#[must_use]
pub fn within_radius(distance: f64, radius: f64) -> bool {
    distance.is_finite() && radius.is_finite() && distance <= radius
}
