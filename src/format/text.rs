//! Human-readable text output formatter

use crate::discovery::DiscoveryResponse;
use crate::error::Result;
use crate::format::{format_distance, OutputFormatter};
use crate::poi::{Category, Poi};
use std::collections::BTreeMap;

/// Text formatter - outputs POIs grouped by category
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text grouped by category"
    }

    fn format(&self, response: &DiscoveryResponse) -> Result<String> {
        let mut output = String::new();

        // Header
        output.push_str(&format!("nearby discovery ({})\n", response.id));
        if let Some(name) = &response.metadata.location_name {
            output.push_str(&format!("Location: {}\n", name));
        }
        output.push_str(&format!("Center: {}\n", response.center()));
        output.push_str(&format!(
            "Radius: {} ({} {})\n",
            format_distance(response.outcome.radius_used_meters),
            response.outcome.attempts,
            if response.outcome.attempts == 1 { "attempt" } else { "attempts" }
        ));
        output.push_str(&format!("Found: {} places\n", response.pois().len()));

        if response.pois().is_empty() {
            output.push_str("\nNothing found nearby.\n");
            return Ok(output);
        }

        // Category order; each group keeps the ranked distance order
        let mut groups: BTreeMap<Category, Vec<&Poi>> = BTreeMap::new();
        for poi in response.pois() {
            groups.entry(poi.category).or_default().push(poi);
        }

        let width = response
            .pois()
            .iter()
            .map(|p| p.name.chars().count())
            .max()
            .unwrap_or(0);

        for (category, pois) in groups {
            output.push_str(&format!("\n{} ({}):\n", category.label(), pois.len()));
            for poi in pois {
                output.push_str(&format!(
                    "  {:<width$}  {:>7}  {}\n",
                    poi.name,
                    format_distance(poi.distance_meters),
                    poi.location,
                    width = width
                ));
            }
        }

        Ok(output)
    }
}
