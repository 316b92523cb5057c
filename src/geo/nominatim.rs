//! Nominatim geocoding backend (OpenStreetMap)
//!
//! Uses the free Nominatim API for geocoding.
//! Rate limit: 1 request per second (enforced by User-Agent requirement)

use crate::config::defaults::DEFAULT_GEOCODING_TIMEOUT_SECS;
use crate::constants::api::{NOMINATIM_URL, USER_AGENT};
use crate::error::{Error, Result};
use crate::geo::{unavailable, GeoBackend, GeoLocation};
use serde::Deserialize;
use std::time::Duration;

/// Nominatim geocoding backend
#[derive(Debug, Clone)]
pub struct NominatimBackend {
    client: reqwest::Client,
    base_url: String,
}

/// Nominatim search response item
#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: String,
}

impl NominatimBackend {
    /// Create a new Nominatim backend against the public instance
    pub fn new() -> Result<Self> {
        Self::with_base_url(
            NOMINATIM_URL,
            USER_AGENT,
            Duration::from_secs(DEFAULT_GEOCODING_TIMEOUT_SECS),
        )
    }

    /// Create a backend against a specific Nominatim instance
    ///
    /// `timeout` bounds each request from connect to the end of the body.
    pub fn with_base_url(
        base_url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Parse lat/lng strings to f64
    fn parse_coords(lat: &str, lng: &str) -> Result<(f64, f64)> {
        let lat: f64 = lat.parse().map_err(|_| {
            Error::GeocodingUnavailable(format!("Invalid latitude in response: {}", lat))
        })?;
        let lng: f64 = lng.parse().map_err(|_| {
            Error::GeocodingUnavailable(format!("Invalid longitude in response: {}", lng))
        })?;
        Ok((lat, lng))
    }

    /// Take the first (authoritative) candidate of a search response
    fn first_result(results: Vec<NominatimResult>) -> Result<Option<GeoLocation>> {
        let Some(result) = results.into_iter().next() else {
            return Ok(None);
        };

        let (lat, lng) = Self::parse_coords(&result.lat, &result.lon)?;
        Ok(Some(GeoLocation {
            lat,
            lng,
            display_name: result.display_name,
        }))
    }
}

impl GeoBackend for NominatimBackend {
    async fn geocode(&self, query: &str) -> Result<Option<GeoLocation>> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            urlencoding::encode(query)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| unavailable("Nominatim", e))?;

        if !response.status().is_success() {
            return Err(Error::GeocodingUnavailable(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let results: Vec<NominatimResult> = response.json().await.map_err(|e| {
            if e.is_timeout() {
                unavailable("Nominatim", e)
            } else {
                Error::GeocodingUnavailable(format!("Failed to parse Nominatim response: {}", e))
            }
        })?;

        Self::first_result(results)
    }
}
