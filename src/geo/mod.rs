//! Geocoding module
//!
//! Provides geocoding (location name to coordinates), IP geolocation and the
//! [`LocationResolver`](resolver::LocationResolver) that turns user input
//! into a search center.

pub mod ip_location;
pub mod nominatim;
pub mod resolver;

pub use resolver::LocationResolver;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A geocoded location result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
    /// Display name (address or description)
    pub display_name: String,
}

/// Trait for geocoding backends
pub trait GeoBackend: Send + Sync {
    /// Geocode a location string to coordinates
    ///
    /// Returns the top match for the query, or None if nothing matched.
    /// Transport failures are `Err(Error::GeocodingUnavailable)`.
    fn geocode(
        &self,
        query: &str,
    ) -> impl std::future::Future<Output = Result<Option<GeoLocation>>> + Send;
}

/// Map a transport failure of a location service to `GeocodingUnavailable`
pub(crate) fn unavailable(service: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::GeocodingUnavailable(format!("{} request timed out", service))
    } else {
        Error::GeocodingUnavailable(format!("{} request failed: {}", service, err))
    }
}

/// Endpoints that misbehave, for timeout tests
#[cfg(test)]
pub(crate) mod testing {
    use tokio::net::TcpListener;

    /// Accepts connections and never answers. Returns the base URL.
    pub async fn stalled_endpoint() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{}", addr)
    }
}
