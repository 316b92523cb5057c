//! Distance and bounding box arithmetic
//!
//! Both functions assume already-validated coordinates.

use crate::constants::geo::{EARTH_RADIUS_METERS, KM_PER_DEGREE};
use crate::coord::{BoundingBox, Coordinates};
use crate::error::{Error, Result};

/// Calculate the distance between two points in meters (Haversine formula)
///
/// The result is rounded to the nearest whole meter, so it is exactly zero
/// for identical inputs and symmetric in its arguments.
pub fn distance_meters(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    (EARTH_RADIUS_METERS * c).round()
}

/// Square box around `center` with half-width `radius_meters`
///
/// # Algorithm
/// One degree is taken as 111 km on both axes. This is an equirectangular
/// approximation: the box gets too narrow in longitude away from the equator
/// and does not wrap across the antimeridian. Good enough for the few-km
/// radii used by discovery.
pub fn bounding_box(center: Coordinates, radius_meters: f64) -> Result<BoundingBox> {
    if radius_meters <= 0.0 || !radius_meters.is_finite() {
        return Err(Error::InvalidRadius(format!(
            "Radius must be positive, got {}",
            radius_meters
        )));
    }

    let degrees = (radius_meters / 1000.0) / KM_PER_DEGREE;

    Ok(BoundingBox {
        south: center.lat - degrees,
        west: center.lng - degrees,
        north: center.lat + degrees,
        east: center.lng + degrees,
    })
}
