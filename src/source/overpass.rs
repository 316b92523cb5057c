//! Overpass API spatial provider (OpenStreetMap)
//!
//! Posts one Overpass QL script per category and maps the returned elements
//! to raw features. Ways carry the server-computed `center`.

use crate::constants::api::{OVERPASS_URL, USER_AGENT};
use crate::constants::source::SERVER_TIMEOUT_SECS;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::poi::RawFeature;
use crate::query::CategoryQuery;
use crate::source::SpatialProvider;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Overpass backend
#[derive(Debug, Clone)]
pub struct OverpassBackend {
    client: reqwest::Client,
    url: String,
    server_timeout_secs: u64,
}

/// Overpass JSON response
#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

/// A single node/way/relation
#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    kind: String,
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}

impl OverpassElement {
    /// Point location for nodes, computed center for areas
    fn location(&self) -> Option<Coordinates> {
        match (self.lat, self.lon, &self.center) {
            (Some(lat), Some(lon), _) => Some(Coordinates::new(lat, lon)),
            (_, _, Some(center)) => Some(Coordinates::new(center.lat, center.lon)),
            _ => None,
        }
    }

    fn into_raw(self, query: &CategoryQuery) -> RawFeature {
        let location = self.location();
        RawFeature::from_tags(
            format!("{}/{}", self.kind, self.id),
            location,
            self.tags,
            Some(query.category),
        )
    }
}

impl OverpassBackend {
    /// Create a backend against the public Overpass instance
    pub fn new() -> Result<Self> {
        Self::with_url(OVERPASS_URL, SERVER_TIMEOUT_SECS)
    }

    /// Create a backend against a specific interpreter endpoint
    pub fn with_url(url: impl Into<String>, server_timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            url: url.into(),
            server_timeout_secs,
        })
    }

    /// Parse an interpreter response body into raw features
    fn parse_response(body: &str, query: &CategoryQuery) -> Result<Vec<RawFeature>> {
        let response: OverpassResponse = serde_json::from_str(body)
            .map_err(|e| Error::Provider(format!("Failed to parse Overpass response: {}", e)))?;

        Ok(response
            .elements
            .into_iter()
            .map(|element| element.into_raw(query))
            .collect())
    }
}

impl SpatialProvider for OverpassBackend {
    fn name(&self) -> &'static str {
        "overpass"
    }

    async fn fetch(&self, query: &CategoryQuery, timeout: Duration) -> Result<Vec<RawFeature>> {
        let ql = query.to_overpass_ql(self.server_timeout_secs);
        debug!(category = %query.category, %ql, "posting overpass query");

        let response = self
            .client
            .post(&self.url)
            .timeout(timeout)
            .body(ql)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("Overpass request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Provider(format!(
                "Overpass returned status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Provider(format!("Failed to read Overpass response: {}", e)))?;

        Self::parse_response(&body, query)
    }
}
