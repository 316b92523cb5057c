//! IP-based geolocation
//!
//! Uses ip-api.com to approximate the caller's current location. Results are
//! not cached; each lookup is one request.

use crate::config::defaults::DEFAULT_GEOCODING_TIMEOUT_SECS;
use crate::constants::api::{IP_API_URL, USER_AGENT};
use crate::error::{Error, Result};
use crate::geo::{unavailable, GeoLocation};
use serde::Deserialize;
use std::time::Duration;

/// IP location service
#[derive(Debug, Clone)]
pub struct IpLocator {
    client: reqwest::Client,
    url: String,
}

/// ip-api.com response
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    #[serde(rename = "regionName")]
    region_name: Option<String>,
    country: Option<String>,
}

impl IpLocator {
    /// Create a new IP locator against ip-api.com
    pub fn new() -> Result<Self> {
        Self::with_url(IP_API_URL, Duration::from_secs(DEFAULT_GEOCODING_TIMEOUT_SECS))
    }

    /// Create an IP locator against a specific endpoint
    pub fn with_url(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Get current location based on IP address
    pub async fn locate(&self) -> Result<GeoLocation> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| unavailable("IP location", e))?;

        if !response.status().is_success() {
            return Err(Error::GeocodingUnavailable(format!(
                "IP location API returned status: {}",
                response.status()
            )));
        }

        let data: IpApiResponse = response
            .json()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    unavailable("IP location", e)
                } else {
                    Error::Geo(format!("Failed to parse IP location response: {}", e))
                }
            })?;

        Self::into_location(data)
    }

    fn into_location(data: IpApiResponse) -> Result<GeoLocation> {
        if data.status != "success" {
            return Err(Error::Geo("IP location lookup failed".to_string()));
        }

        let lat = data.lat.ok_or_else(|| Error::Geo("No latitude in response".to_string()))?;
        let lng = data.lon.ok_or_else(|| Error::Geo("No longitude in response".to_string()))?;

        // Build display name from available fields
        let display_name = [data.city, data.region_name, data.country]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");

        Ok(GeoLocation {
            lat,
            lng,
            display_name: if display_name.is_empty() {
                "Unknown Location".to_string()
            } else {
                display_name
            },
        })
    }
}
