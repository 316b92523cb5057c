//! GPX output formatter

use crate::discovery::DiscoveryResponse;
use crate::error::Result;
use crate::format::{format_distance, OutputFormatter};
use crate::poi::Category;

/// GPX formatter - outputs GPX waypoint file
pub struct GpxFormatter;

fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn symbol(category: Category) -> &'static str {
    match category {
        Category::Restaurant => "Restaurant",
        Category::Pharmacy => "Pharmacy",
        Category::Supermarket => "Shopping Center",
        Category::Cafe => "Restaurant",
        Category::Bar => "Bar",
        Category::Attraction => "Scenic Area",
        Category::Hospital => "Medical Facility",
        Category::Parking => "Parking Area",
    }
}

impl OutputFormatter for GpxFormatter {
    fn name(&self) -> &str {
        "gpx"
    }

    fn description(&self) -> &str {
        "GPX waypoint file"
    }

    fn format(&self, response: &DiscoveryResponse) -> Result<String> {
        let mut gpx = String::new();

        // XML header
        gpx.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        gpx.push('\n');
        gpx.push_str(r#"<gpx version="1.1" creator="nearby">"#);
        gpx.push('\n');

        // Metadata
        gpx.push_str("  <metadata>\n");
        gpx.push_str(&format!("    <name>nearby discovery {}</name>\n", response.id));
        gpx.push_str(&format!("    <time>{}</time>\n", response.metadata.timestamp));
        gpx.push_str("  </metadata>\n");

        // Center waypoint
        gpx.push_str(&format!(
            r#"  <wpt lat="{}" lon="{}">"#,
            response.request.lat, response.request.lng
        ));
        gpx.push('\n');
        gpx.push_str("    <name>Center</name>\n");
        gpx.push_str(&format!(
            "    <desc>Search center, radius: {}</desc>\n",
            format_distance(response.outcome.radius_used_meters)
        ));
        gpx.push_str("  </wpt>\n");

        // One waypoint per POI
        for poi in response.pois() {
            gpx.push_str(&format!(
                r#"  <wpt lat="{}" lon="{}">"#,
                poi.location.lat, poi.location.lng
            ));
            gpx.push('\n');
            gpx.push_str(&format!("    <name>{}</name>\n", escape_xml(&poi.name)));
            gpx.push_str(&format!(
                "    <desc>{}, {} away ({})</desc>\n",
                poi.category.label(),
                format_distance(poi.distance_meters),
                escape_xml(&poi.id)
            ));
            gpx.push_str(&format!("    <sym>{}</sym>\n", symbol(poi.category)));
            gpx.push_str(&format!("    <type>{}</type>\n", poi.category));
            gpx.push_str("  </wpt>\n");
        }

        gpx.push_str("</gpx>\n");
        Ok(gpx)
    }
}
