//! Output formatters
//!
//! Provides trait-based output formatting for discovery results.

pub mod gpx;
pub mod json;
pub mod text;

use crate::discovery::DiscoveryResponse;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Get the format name
    fn name(&self) -> &str;

    /// Get the format description
    fn description(&self) -> &str;

    /// Format the discovery response
    fn format(&self, response: &DiscoveryResponse) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        "gpx" => Some(Box::new(gpx::GpxFormatter)),
        _ => None,
    }
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    let formatters: [Box<dyn OutputFormatter>; 3] = [
        Box::new(json::JsonFormatter),
        Box::new(text::TextFormatter),
        Box::new(gpx::GpxFormatter),
    ];

    formatters
        .iter()
        .map(|f| FormatInfo {
            name: f.name().to_string(),
            description: f.description().to_string(),
        })
        .collect()
}

/// Human-friendly distance: meters below 1 km, otherwise km with one decimal
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{}m", meters.round())
    } else {
        format!("{:.1}km", meters / 1000.0)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::coord::Coordinates;
    use crate::discovery::{DiscoveryMetadata, DiscoveryResponse, RequestSummary};
    use crate::poi::{Category, Poi};
    use crate::search::SearchOutcome;

    fn poi(id: &str, name: &str, category: Category, lat: f64, lng: f64, distance: f64) -> Poi {
        Poi {
            id: id.to_string(),
            name: name.to_string(),
            location: Coordinates::new(lat, lng),
            category,
            distance_meters: distance,
        }
    }

    /// A settled discovery around lower Manhattan
    pub fn sample_response() -> DiscoveryResponse {
        DiscoveryResponse {
            id: "6f1c2a34-0000-4000-8000-000000000001".to_string(),
            request: RequestSummary {
                input: Some("City Hall, New York".to_string()),
                lat: 40.7128,
                lng: -74.006,
                categories: vec![Category::Cafe, Category::Pharmacy],
            },
            outcome: SearchOutcome {
                pois: vec![
                    poi("node/1", "Joe's Coffee", Category::Cafe, 40.7130, -74.0061, 24.0),
                    poi("node/2", "Duane Reade", Category::Pharmacy, 40.7140, -74.0050, 157.0),
                    poi("way/3", "Café <Lumière> & Co", Category::Cafe, 40.7160, -74.0040, 393.0),
                    poi("node/4", "CVS", Category::Pharmacy, 40.7230, -74.0010, 1202.0),
                ],
                radius_used_meters: 1500.0,
                attempts: 2,
            },
            metadata: DiscoveryMetadata {
                timestamp: "2026-01-01T12:00:00+00:00".to_string(),
                location_name: Some("City Hall, Manhattan, New York".to_string()),
                provider: "overpass".to_string(),
            },
        }
    }

    pub fn empty_response() -> DiscoveryResponse {
        let mut response = sample_response();
        response.outcome.pois.clear();
        response.outcome.radius_used_meters = 5062.5;
        response.outcome.attempts = 5;
        response
    }
}
