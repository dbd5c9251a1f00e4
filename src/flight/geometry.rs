//! Flat-earth displacement math for landing dispersion.
//!
//! Dispersion patterns span a few kilometers at most, so launch-to-landing
//! displacement uses a local flat-earth approximation with fixed meters per
//! degree rather than great-circle arithmetic. Error stays below 0.1% at
//! these distances in the mid latitudes the conversion factors assume.

use super::GeoPosition;

/// Northward meters per degree of latitude.
pub const METERS_PER_DEGREE_LATITUDE: f64 = 111_325.0;

/// Eastward meters per degree of longitude.
pub const METERS_PER_DEGREE_LONGITUDE: f64 = 111_050.0;

/// Planar displacement from `start` to `end` as `(east_m, north_m)`.
#[must_use]
pub fn displacement_m(start: GeoPosition, end: GeoPosition) -> (f64, f64) {
    let north_m = (end.latitude_deg - start.latitude_deg) * METERS_PER_DEGREE_LATITUDE;
    let east_m = (end.longitude_deg - start.longitude_deg) * METERS_PER_DEGREE_LONGITUDE;
    (east_m, north_m)
}

/// Straight-line ground distance from `start` to `end` in meters.
#[must_use]
pub fn range_flat(start: GeoPosition, end: GeoPosition) -> f64 {
    let (east_m, north_m) = displacement_m(start, end);
    east_m.hypot(north_m)
}

/// Direction from `start` to `end` in radians.
///
/// Mathematical convention: due east = 0, due north = pi/2, due west = pi,
/// due south = -pi/2. `atan2` keeps every quadrant correct, including
/// displacements that are due west or nearly so.
#[must_use]
pub fn bearing_flat(start: GeoPosition, end: GeoPosition) -> f64 {
    let (east_m, north_m) = displacement_m(start, end);
    north_m.atan2(east_m)
}
