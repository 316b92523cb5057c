//! Points of interest
//!
//! Defines the fixed category set, the raw provider records and the
//! validated [`Poi`] values built from them.

pub mod category;

pub use category::{Category, TagPredicate};

use crate::coord::{distance_meters, Coordinates};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A record as returned by a spatial provider
///
/// Any field may be missing; see [`RawFeature::is_usable`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawFeature {
    /// Provider-assigned identifier
    pub id: String,

    /// Point location or computed center of an area
    pub location: Option<Coordinates>,

    /// Value of the `name` tag
    pub name: Option<String>,

    /// Category discriminated from the tags
    pub category: Option<Category>,

    /// All provider tags
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl RawFeature {
    /// Build a raw feature from provider tags, pulling out name and category
    ///
    /// `hint` is the category that was queried. It wins when its predicates
    /// match the tags, since one feature may satisfy several categories.
    pub fn from_tags(
        id: impl Into<String>,
        location: Option<Coordinates>,
        tags: HashMap<String, String>,
        hint: Option<Category>,
    ) -> Self {
        let name = tags.get("name").cloned();
        let category = match hint {
            Some(category) if category.matches(&tags) => Some(category),
            _ => Category::from_tags(&tags),
        };

        Self {
            id: id.into(),
            location,
            name,
            category,
            tags,
        }
    }

    /// Whether this record carries everything a [`Poi`] needs
    pub fn is_usable(&self) -> bool {
        let has_name = self.name.as_deref().is_some_and(|n| !n.trim().is_empty());
        let has_location = self.location.is_some_and(|l| l.validate().is_ok());
        has_name && has_location && self.category.is_some()
    }
}

/// A named, categorized place with its distance from the search center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub id: String,
    pub name: String,
    pub location: Coordinates,
    pub category: Category,
    pub distance_meters: f64,
}

impl Poi {
    /// Build a POI from a raw feature, or `None` if it is malformed
    pub fn from_raw(center: Coordinates, raw: RawFeature) -> Option<Self> {
        if !raw.is_usable() {
            return None;
        }

        let location = raw.location?;
        let name = raw.name?.trim().to_string();

        Some(Self {
            id: raw.id,
            name,
            location,
            category: raw.category?,
            distance_meters: distance_meters(center, location),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_tags_extracts_name_and_category() {
        let raw = RawFeature::from_tags(
            "node/1",
            Some(Coordinates::new(37.7749, -122.4194)),
            tags(&[("amenity", "cafe"), ("name", "Blue Bottle")]),
            None,
        );

        assert_eq!(raw.name.as_deref(), Some("Blue Bottle"));
        assert_eq!(raw.category, Some(Category::Cafe));
        assert!(raw.is_usable());
    }

    #[test]
    fn test_from_tags_prefers_matching_hint() {
        // A hospital pharmacy tagged under both schemes
        let both = tags(&[
            ("amenity", "pharmacy"),
            ("healthcare", "hospital"),
            ("name", "St. Mary"),
        ]);

        let raw = RawFeature::from_tags("way/2", None, both.clone(), Some(Category::Hospital));
        assert_eq!(raw.category, Some(Category::Hospital));

        // A hint that does not match the tags is ignored
        let raw = RawFeature::from_tags("way/2", None, both, Some(Category::Parking));
        assert_eq!(raw.category, Some(Category::Pharmacy));
    }

    #[test]
    fn test_unusable_features() {
        let location = Some(Coordinates::new(1.0, 1.0));

        let no_name = RawFeature::from_tags("node/1", location, tags(&[("amenity", "bar")]), None);
        assert!(!no_name.is_usable());

        let blank_name = RawFeature::from_tags(
            "node/2",
            location,
            tags(&[("amenity", "bar"), ("name", "   ")]),
            None,
        );
        assert!(!blank_name.is_usable());

        let no_location =
            RawFeature::from_tags("node/3", None, tags(&[("amenity", "bar"), ("name", "X")]), None);
        assert!(!no_location.is_usable());

        let unknown_category = RawFeature::from_tags(
            "node/4",
            location,
            tags(&[("amenity", "bench"), ("name", "X")]),
            None,
        );
        assert!(!unknown_category.is_usable());
    }

    #[test]
    fn test_poi_from_raw() {
        let center = Coordinates::new(37.7749, -122.4194);
        let raw = RawFeature::from_tags(
            "node/7",
            Some(Coordinates::new(37.7849, -122.4194)),
            tags(&[("amenity", "restaurant"), ("name", " Zuni Cafe ")]),
            Some(Category::Restaurant),
        );

        let poi = Poi::from_raw(center, raw).unwrap();
        assert_eq!(poi.id, "node/7");
        assert_eq!(poi.name, "Zuni Cafe");
        assert_eq!(poi.category, Category::Restaurant);
        assert_eq!(poi.distance_meters, 1112.0);
    }

    #[test]
    fn test_poi_from_malformed_raw() {
        let center = Coordinates::new(0.0, 0.0);
        assert!(Poi::from_raw(center, RawFeature::default()).is_none());
    }
}
