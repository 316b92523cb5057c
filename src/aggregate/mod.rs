//! Result aggregation
//!
//! Turns the merged raw features of one search cycle into a deduplicated,
//! distance-ranked POI list.
//!
//! ## Deduplication
//! Provider ids are not trusted for identity: the same place is often tagged
//! under several schemes (e.g. as a node and as a building outline). Two POIs
//! are the same place when their coordinates round to the same grid cell at
//! four decimal places (~11 m). On collision the last-seen record replaces
//! the earlier one in the earlier one's position.

use crate::constants::geo::DEDUP_CELLS_PER_DEGREE;
use crate::coord::Coordinates;
use crate::poi::{Poi, RawFeature};
use std::collections::HashMap;

/// Grid cell of a coordinate at the deduplication resolution
pub fn grid_cell(coords: Coordinates) -> (i64, i64) {
    (
        (coords.lat * DEDUP_CELLS_PER_DEGREE).round() as i64,
        (coords.lng * DEDUP_CELLS_PER_DEGREE).round() as i64,
    )
}

/// Map, deduplicate and rank raw features around `center`
///
/// Output is sorted ascending by distance; ties keep insertion order.
pub fn aggregate(center: Coordinates, features: Vec<RawFeature>) -> Vec<Poi> {
    let mut slots: HashMap<(i64, i64), usize> = HashMap::new();
    let mut pois: Vec<Poi> = Vec::with_capacity(features.len());

    for poi in features
        .into_iter()
        .filter_map(|raw| Poi::from_raw(center, raw))
    {
        match slots.get(&grid_cell(poi.location)) {
            Some(&index) => pois[index] = poi,
            None => {
                slots.insert(grid_cell(poi.location), pois.len());
                pois.push(poi);
            }
        }
    }

    // Stable: equal distances keep insertion order
    pois.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
    pois
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poi::Category;
    use crate::source::testing::feature;

    const SF: Coordinates = Coordinates {
        lat: 37.7749,
        lng: -122.4194,
    };

    #[test]
    fn test_empty_input() {
        assert!(aggregate(SF, Vec::new()).is_empty());
    }

    #[test]
    fn test_sorted_by_distance() {
        let features = vec![
            feature("node/1", "Far", Category::Bar, 37.7849, -122.4194),
            feature("node/2", "Near", Category::Cafe, 37.7759, -122.4194),
            feature("node/3", "Middle", Category::Restaurant, 37.7799, -122.4194),
        ];

        let pois = aggregate(SF, features);

        let names: Vec<_> = pois.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Near", "Middle", "Far"]);
        assert!(pois
            .windows(2)
            .all(|w| w[0].distance_meters <= w[1].distance_meters));
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        // Same distance north and south of the center
        let features = vec![
            feature("node/1", "North", Category::Bar, 37.7759, -122.4194),
            feature("node/2", "South", Category::Bar, 37.7739, -122.4194),
        ];

        let pois = aggregate(SF, features);

        assert_eq!(pois[0].distance_meters, pois[1].distance_meters);
        assert_eq!(pois[0].name, "North");
        assert_eq!(pois[1].name, "South");
    }

    #[test]
    fn test_same_grid_cell_collapses() {
        let features = vec![
            feature("node/1", "Joe's", Category::Cafe, 40.7128001, -74.0060001),
            feature("way/9", "Joe's Coffee", Category::Cafe, 40.7128002, -74.0060002),
        ];

        let pois = aggregate(Coordinates::new(40.7128, -74.0060), features);

        assert_eq!(pois.len(), 1);
        // Last seen wins
        assert_eq!(pois[0].id, "way/9");
    }

    #[test]
    fn test_duplicate_is_idempotent() {
        let once = vec![
            feature("node/1", "A", Category::Cafe, 37.7750, -122.4190),
            feature("node/2", "B", Category::Bar, 37.7760, -122.4180),
        ];
        let mut twice = once.clone();
        twice.push(once[0].clone());

        assert_eq!(aggregate(SF, once).len(), aggregate(SF, twice).len());
    }

    #[test]
    fn test_same_id_different_places_are_kept() {
        let features = vec![
            feature("node/1", "A", Category::Cafe, 37.7750, -122.4190),
            feature("node/1", "B", Category::Bar, 37.7790, -122.4150),
        ];

        assert_eq!(aggregate(SF, features).len(), 2);
    }

    #[test]
    fn test_malformed_features_are_skipped() {
        let mut nameless = feature("node/1", "A", Category::Cafe, 37.7750, -122.4190);
        nameless.name = None;

        assert!(aggregate(SF, vec![nameless]).is_empty());
    }

    #[test]
    fn test_grid_cell() {
        assert_eq!(
            grid_cell(Coordinates::new(40.7128001, -74.0060001)),
            (407_128, -740_060)
        );
        assert_ne!(
            grid_cell(Coordinates::new(40.7128, -74.0060)),
            grid_cell(Coordinates::new(40.7129, -74.0060))
        );
    }
}
