//! Per-category spatial queries
//!
//! Builds one query per category from a center and radius and renders it as
//! Overpass QL. Pure, no I/O.

use crate::coord::{bounding_box, BoundingBox, Coordinates};
use crate::error::Result;
use crate::poi::{Category, TagPredicate};
use serde::Serialize;

/// OpenStreetMap element kinds a query selects
///
/// A place can be mapped as a point (`node`) or as an outline (`way`);
/// both are queried so neither representation is missed.
pub const ELEMENT_KINDS: [&str; 2] = ["node", "way"];

/// A bounding-box query for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryQuery {
    pub category: Category,
    pub bbox: BoundingBox,
    pub predicates: &'static [TagPredicate],
}

impl CategoryQuery {
    /// Render as an Overpass QL script
    ///
    /// `server_timeout_secs` goes into the `[timeout:N]` header. `out center`
    /// makes the server attach a computed center to way elements.
    pub fn to_overpass_ql(&self, server_timeout_secs: u64) -> String {
        let bbox = format!(
            "({},{},{},{})",
            self.bbox.south, self.bbox.west, self.bbox.north, self.bbox.east
        );

        let mut ql = format!("[out:json][timeout:{}];\n(\n", server_timeout_secs);
        for predicate in self.predicates {
            for kind in ELEMENT_KINDS {
                ql.push_str(&format!(
                    "  {}[\"{}\"=\"{}\"]{};\n",
                    kind, predicate.key, predicate.value, bbox
                ));
            }
        }
        ql.push_str(");\nout center;\n");
        ql
    }
}

/// Build one query per category in `categories`
pub fn build_queries(
    center: Coordinates,
    radius_meters: f64,
    categories: &[Category],
) -> Result<Vec<CategoryQuery>> {
    let bbox = bounding_box(center, radius_meters)?;

    Ok(categories
        .iter()
        .map(|&category| CategoryQuery {
            category,
            bbox,
            predicates: category.predicates(),
        })
        .collect())
}

/// Build queries for every category
pub fn build_all_queries(center: Coordinates, radius_meters: f64) -> Result<Vec<CategoryQuery>> {
    build_queries(center, radius_meters, &Category::ALL)
}
