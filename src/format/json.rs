//! JSON output formatter

use crate::discovery::DiscoveryResponse;
use crate::error::Result;
use crate::format::OutputFormatter;

/// JSON formatter - outputs full response as pretty-printed JSON
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Full JSON response"
    }

    fn format(&self, response: &DiscoveryResponse) -> Result<String> {
        Ok(serde_json::to_string_pretty(response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::testing::sample_response;

    #[test]
    fn test_json_format() {
        let output = JsonFormatter.format(&sample_response()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(parsed.get("id").is_some());
        assert_eq!(parsed["request"]["input"], "City Hall, New York");
        assert_eq!(parsed["radius_used_meters"], 1500.0);
        assert_eq!(parsed["attempts"], 2);
        assert_eq!(parsed["pois"].as_array().unwrap().len(), 4);
        assert_eq!(parsed["pois"][0]["category"], "cafe");
        assert_eq!(parsed["metadata"]["provider"], "overpass");
    }

    #[test]
    fn test_json_parses_back() {
        let response = sample_response();
        let output = JsonFormatter.format(&response).unwrap();
        let parsed: DiscoveryResponse = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.outcome, response.outcome);
    }

    #[test]
    fn test_json_formatter_info() {
        assert_eq!(JsonFormatter.name(), "json");
        assert!(!JsonFormatter.description().is_empty());
    }
}
