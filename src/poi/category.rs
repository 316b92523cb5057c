//! POI categories and their OpenStreetMap tag predicates

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A `key=value` tag selector understood by the spatial provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TagPredicate {
    pub key: &'static str,
    pub value: &'static str,
}

impl TagPredicate {
    const fn new(key: &'static str, value: &'static str) -> Self {
        Self { key, value }
    }

    /// Check whether a tag map satisfies this predicate
    pub fn matches(&self, tags: &HashMap<String, String>) -> bool {
        tags.get(self.key).is_some_and(|v| v == self.value)
    }
}

impl std::fmt::Display for TagPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// The fixed set of POI kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Restaurant,
    Pharmacy,
    Supermarket,
    Cafe,
    Bar,
    Attraction,
    Hospital,
    Parking,
}

impl Category {
    /// Every category, in query order
    pub const ALL: [Category; 8] = [
        Self::Restaurant,
        Self::Pharmacy,
        Self::Supermarket,
        Self::Cafe,
        Self::Bar,
        Self::Attraction,
        Self::Hospital,
        Self::Parking,
    ];

    /// Provider tag predicates; a feature matching any of them belongs here
    pub fn predicates(&self) -> &'static [TagPredicate] {
        const RESTAURANT: &[TagPredicate] = &[TagPredicate::new("amenity", "restaurant")];
        const PHARMACY: &[TagPredicate] = &[
            TagPredicate::new("amenity", "pharmacy"),
            TagPredicate::new("healthcare", "pharmacy"),
        ];
        const SUPERMARKET: &[TagPredicate] = &[TagPredicate::new("shop", "supermarket")];
        const CAFE: &[TagPredicate] = &[TagPredicate::new("amenity", "cafe")];
        const BAR: &[TagPredicate] = &[
            TagPredicate::new("amenity", "bar"),
            TagPredicate::new("amenity", "pub"),
        ];
        const ATTRACTION: &[TagPredicate] = &[TagPredicate::new("tourism", "attraction")];
        const HOSPITAL: &[TagPredicate] = &[
            TagPredicate::new("amenity", "hospital"),
            TagPredicate::new("healthcare", "hospital"),
        ];
        const PARKING: &[TagPredicate] = &[TagPredicate::new("amenity", "parking")];

        match self {
            Self::Restaurant => RESTAURANT,
            Self::Pharmacy => PHARMACY,
            Self::Supermarket => SUPERMARKET,
            Self::Cafe => CAFE,
            Self::Bar => BAR,
            Self::Attraction => ATTRACTION,
            Self::Hospital => HOSPITAL,
            Self::Parking => PARKING,
        }
    }

    /// Check whether a tag map matches any of this category's predicates
    pub fn matches(&self, tags: &HashMap<String, String>) -> bool {
        self.predicates().iter().any(|p| p.matches(tags))
    }

    /// First category (in [`Category::ALL`] order) matching the tags
    pub fn from_tags(tags: &HashMap<String, String>) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.matches(tags))
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Restaurant => "Restaurant",
            Self::Pharmacy => "Pharmacy",
            Self::Supermarket => "Supermarket",
            Self::Cafe => "Cafe",
            Self::Bar => "Bar",
            Self::Attraction => "Attraction",
            Self::Hospital => "Hospital",
            Self::Parking => "Parking",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Restaurant => "restaurant",
            Self::Pharmacy => "pharmacy",
            Self::Supermarket => "supermarket",
            Self::Cafe => "cafe",
            Self::Bar => "bar",
            Self::Attraction => "attraction",
            Self::Hospital => "hospital",
            Self::Parking => "parking",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

/// Parse a comma-separated category list; empty input means every category
pub fn parse_list(s: &str) -> Result<Vec<Category>, String> {
    let mut categories = Vec::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let category: Category = part.parse()?;
        if !categories.contains(&category) {
            categories.push(category);
        }
    }

    if categories.is_empty() {
        Ok(Category::ALL.to_vec())
    } else {
        Ok(categories)
    }
}
