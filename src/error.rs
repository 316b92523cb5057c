//! Error types for nearby

use thiserror::Error;

/// Main error type for discovery operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid radius: {0}")]
    InvalidRadius(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Geocoding unavailable: {0}")]
    GeocodingUnavailable(String),

    #[error("All {attempted} category sources failed")]
    AllSourcesFailed { attempted: usize },

    /// A single category fetch failed. Swallowed by the source fetcher.
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Discovery cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Geo error: {0}")]
    Geo(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether a fresh discovery operation might succeed where this one failed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::GeocodingUnavailable(_) | Self::AllSourcesFailed { .. } | Self::Http(_)
        )
    }
}

/// Result type alias for nearby operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(Error::AllSourcesFailed { attempted: 8 }.is_retryable());
        assert!(Error::GeocodingUnavailable("timeout".to_string()).is_retryable());
        assert!(!Error::InvalidRadius("0".to_string()).is_retryable());
        assert!(!Error::LocationNotFound("nowhere".to_string()).is_retryable());
        assert!(!Error::Cancelled.is_retryable());
    }

    #[test]
    fn test_all_sources_failed_message() {
        let err = Error::AllSourcesFailed { attempted: 8 };
        assert_eq!(err.to_string(), "All 8 category sources failed");
    }
}
