//! Centralized constants for the nearby crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in meters
    pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

    /// Kilometers per degree used by the bounding box approximation
    pub const KM_PER_DEGREE: f64 = 111.0;

    /// Grid cells per degree for duplicate suppression (four decimals, ~11 m)
    pub const DEDUP_CELLS_PER_DEGREE: f64 = 10_000.0;
}

/// Radius escalation parameters
pub mod search {
    /// Radius of the first search cycle
    pub const INITIAL_RADIUS_METERS: f64 = 1000.0;

    /// Fewer results than this triggers an escalation
    pub const MIN_RESULTS: usize = 5;

    /// No escalation once the radius reaches this ceiling
    pub const MAX_RADIUS_METERS: f64 = 5000.0;

    /// Factor applied to the radius on each escalation
    pub const RADIUS_MULTIPLIER: f64 = 1.5;

    /// Delay before an escalated search cycle starts
    pub const BACKOFF_MS: u64 = 1000;
}

/// Spatial source limits
pub mod source {
    /// Client-side bound on a single category request
    pub const QUERY_TIMEOUT_SECS: u64 = 15;

    /// Server-side bound embedded in the query header
    pub const SERVER_TIMEOUT_SECS: u64 = 10;

    /// Bound on one whole fan-out across all categories
    pub const MAX_TOTAL_TIMEOUT_SECS: u64 = 60;
}

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// Overpass API interpreter endpoint
    pub const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

    /// IP geolocation API (free, no key required)
    pub const IP_API_URL: &str = "http://ip-api.com/json";

    /// User-Agent sent to OpenStreetMap services
    pub const USER_AGENT: &str = concat!("nearby/", env!("CARGO_PKG_VERSION"));
}
