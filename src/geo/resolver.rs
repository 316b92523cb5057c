//! Location resolver
//!
//! Flow: literal "lat,lon" → geocoder top result → error.
//! Never substitutes a default location; that decision is the caller's.

use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geo::GeoBackend;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How a location was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    Literal,
    Geocoded,
}

/// A resolved search center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub coords: Coordinates,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub source: LocationSource,
}

/// Turns free-text input into coordinates
#[derive(Debug, Clone)]
pub struct LocationResolver<G> {
    geocoder: G,
}

impl<G: GeoBackend> LocationResolver<G> {
    pub fn new(geocoder: G) -> Self {
        Self { geocoder }
    }

    /// Resolve input to a coordinate
    pub async fn resolve(&self, input: &str) -> Result<Coordinates> {
        Ok(self.resolve_location(input).await?.coords)
    }

    /// Resolve input, keeping the geocoder's display name
    pub async fn resolve_location(&self, input: &str) -> Result<ResolvedLocation> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::LocationNotFound("empty location".to_string()));
        }

        if let Some(coords) = Coordinates::parse_literal(input) {
            debug!(%coords, "using literal coordinates");
            return Ok(ResolvedLocation {
                coords,
                display_name: None,
                source: LocationSource::Literal,
            });
        }

        let location = self
            .geocoder
            .geocode(input)
            .await?
            .ok_or_else(|| Error::LocationNotFound(input.to_string()))?;

        let coords = Coordinates::checked(location.lat, location.lng).map_err(|e| {
            Error::GeocodingUnavailable(format!("Geocoder returned unusable coordinates: {}", e))
        })?;

        debug!(%coords, name = %location.display_name, "geocoded location");
        Ok(ResolvedLocation {
            coords,
            display_name: Some(location.display_name),
            source: LocationSource::Geocoded,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeGeocoder;
    use super::*;

    #[tokio::test]
    async fn test_literal_skips_geocoder() {
        let resolver = LocationResolver::new(FakeGeocoder::default());

        let coords = resolver.resolve("48.8566,2.3522").await.unwrap();

        assert_eq!(coords, Coordinates::new(48.8566, 2.3522));
        assert_eq!(resolver.geocoder.call_count(), 0);
    }

    #[tokio::test]
    async fn test_free_text_is_geocoded() {
        let resolver =
            LocationResolver::new(FakeGeocoder::default().with_place("Eiffel Tower", 48.8584, 2.2945));

        let location = resolver.resolve_location("  Eiffel Tower ").await.unwrap();

        assert_eq!(location.coords, Coordinates::new(48.8584, 2.2945));
        assert_eq!(location.source, LocationSource::Geocoded);
        assert_eq!(location.display_name.as_deref(), Some("Eiffel Tower"));
        assert_eq!(resolver.geocoder.call_count(), 1);
    }

    #[tokio::test]
    async fn test_out_of_range_literal_is_geocoded() {
        let resolver = LocationResolver::new(FakeGeocoder::default());

        let err = resolver.resolve("95.0,10.0").await.unwrap_err();

        assert!(matches!(err, Error::LocationNotFound(_)));
        assert_eq!(resolver.geocoder.call_count(), 1);
    }

    #[tokio::test]
    async fn test_no_match() {
        let resolver = LocationResolver::new(FakeGeocoder::default());
        let err = resolver.resolve("Atlantis").await.unwrap_err();
        assert!(matches!(err, Error::LocationNotFound(ref q) if q == "Atlantis"));
    }

    #[tokio::test]
    async fn test_geocoder_unavailable() {
        let resolver = LocationResolver::new(FakeGeocoder::unavailable());
        let err = resolver.resolve("Paris").await.unwrap_err();
        assert!(matches!(err, Error::GeocodingUnavailable(_)));
    }

    #[tokio::test]
    async fn test_geocoder_garbage_coordinates() {
        let resolver =
            LocationResolver::new(FakeGeocoder::default().with_place("Nowhere", 123.0, 0.0));
        let err = resolver.resolve("Nowhere").await.unwrap_err();
        assert!(matches!(err, Error::GeocodingUnavailable(_)));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let resolver = LocationResolver::new(FakeGeocoder::default());
        let err = resolver.resolve("   ").await.unwrap_err();
        assert!(matches!(err, Error::LocationNotFound(_)));
        assert_eq!(resolver.geocoder.call_count(), 0);
    }
}
