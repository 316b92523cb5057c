//! Coordinate types and geographic arithmetic
//!
//! This module handles:
//! - Validated latitude/longitude values
//! - Parsing literal "lat,lon" input
//! - Haversine distance and bounding boxes (see [`distance`])

pub mod distance;

pub use distance::{bounding_box, distance_meters};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }

    /// Create coordinates, rejecting out-of-range values
    pub fn checked(lat: f64, lng: f64) -> Result<Self> {
        let coords = Self::new(lat, lng);
        coords.validate()?;
        Ok(coords)
    }

    /// Parse a literal `"lat,lon"` pair such as `"48.8566, 2.3522"`
    ///
    /// Each component is a plain decimal number with an optional leading
    /// minus sign. Returns `None` for anything else, including pairs that
    /// parse but fall outside the valid ranges.
    pub fn parse_literal(input: &str) -> Option<Self> {
        let (lat, lng) = input.split_once(',')?;
        let lat = parse_decimal(lat.trim())?;
        let lng = parse_decimal(lng.trim())?;
        Self::checked(lat, lng).ok()
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// Strict decimal parser: `-?digits[.digits]` or `-?.digits`
fn parse_decimal(s: &str) -> Option<f64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() {
        return None;
    }

    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits, None),
    };

    let int_ok = int_part.chars().all(|c| c.is_ascii_digit());
    let frac_ok = match frac_part {
        Some(frac) => !frac.is_empty() && frac.chars().all(|c| c.is_ascii_digit()),
        None => !int_part.is_empty(),
    };

    if int_ok && frac_ok {
        s.parse().ok()
    } else {
        None
    }
}

/// A rectangular lat/lng region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    /// Check if a coordinate lies inside the box (edges inclusive)
    pub fn contains(&self, coords: Coordinates) -> bool {
        (self.south..=self.north).contains(&coords.lat)
            && (self.west..=self.east).contains(&coords.lng)
    }
}
