//! In-memory spatial index for zone resolution.
//!
//! Builds an R-tree over zone polygons and resolves points to zone names via
//! bounding-box candidates followed by an exact containment test. Overlapping
//! zones resolve to the smallest-area zone so the outcome does not depend on
//! index traversal order. A small boundary tolerance absorbs coordinate
//! precision noise in source data.

use geo::{Area, BoundingRect, Contains, MultiPolygon, Point};
use rstar::{AABB, RTree, RTreeObject};

use crate::geoutil;
use crate::models::ZonePolygon;

/// Points within this many degrees of a zone boundary still match the zone.
const BOUNDARY_TOLERANCE_DEG: f64 = 1e-6;

/// A zone polygon stored in the R-tree with its precomputed envelope and area.
struct ZoneEntry {
    name: String,
    area: f64,
    envelope: AABB<[f64; 2]>,
    geometry: MultiPolygon<f64>,
}

impl RTreeObject for ZoneEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Pre-built spatial index over the zone set. Constructed once per run;
/// nothing is shared across runs.
pub struct ZoneIndex {
    tree: RTree<ZoneEntry>,
}

impl ZoneIndex {
    pub fn build(zones: &[ZonePolygon]) -> Self {
        let entries = zones
            .iter()
            .filter_map(|zone| {
                let rect = zone.geometry.bounding_rect()?;
                let envelope = AABB::from_corners(
                    [
                        rect.min().x - BOUNDARY_TOLERANCE_DEG,
                        rect.min().y - BOUNDARY_TOLERANCE_DEG,
                    ],
                    [
                        rect.max().x + BOUNDARY_TOLERANCE_DEG,
                        rect.max().y + BOUNDARY_TOLERANCE_DEG,
                    ],
                );
                Some(ZoneEntry {
                    name: zone.name.clone(),
                    area: zone.geometry.unsigned_area(),
                    envelope,
                    geometry: zone.geometry.clone(),
                })
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Resolve a (lon, lat) point to a zone name. Among overlapping matches
    /// the smallest-area zone wins.
    pub fn resolve(&self, lon: f64, lat: f64) -> Option<&str> {
        let point = Point::new(lon, lat);
        let query = AABB::from_point([lon, lat]);

        let mut best: Option<&ZoneEntry> = None;
        for entry in self.tree.locate_in_envelope_intersecting(&query) {
            let inside = entry.geometry.contains(&point)
                || geoutil::distance_to_boundary(point, &entry.geometry) <= BOUNDARY_TOLERANCE_DEG;
            if inside {
                match best {
                    None => best = Some(entry),
                    Some(current) if entry.area < current.area => best = Some(entry),
                    _ => {}
                }
            }
        }

        best.map(|e| e.name.as_str())
    }
}

/// Union all zone polygons into a single clip mask, or `None` when the zone
/// set is empty. The boolean-ops backend produces valid output, so no
/// separate repair step is needed.
pub fn clip_mask(zones: &[ZonePolygon]) -> Option<MultiPolygon<f64>> {
    use geo::BooleanOps;

    let mut union: Option<MultiPolygon<f64>> = None;
    for zone in zones {
        if zone.geometry.0.is_empty() {
            continue;
        }
        union = Some(match union {
            None => zone.geometry.clone(),
            Some(acc) => acc.union(&zone.geometry),
        });
    }
    union
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square(name: &str, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> ZonePolygon {
        ZonePolygon {
            name: name.to_string(),
            geometry: MultiPolygon(vec![polygon![
                (x: min_x, y: min_y),
                (x: max_x, y: min_y),
                (x: max_x, y: max_y),
                (x: min_x, y: max_y),
            ]]),
        }
    }

    #[test]
    fn test_resolves_point_inside_zone() {
        let index = ZoneIndex::build(&[square("VNN", 0.0, 0.0, 10.0, 10.0)]);
        assert_eq!(index.resolve(5.0, 5.0), Some("VNN"));
        assert_eq!(index.resolve(25.0, 5.0), None);
    }

    #[test]
    fn test_near_boundary_point_matches_within_tolerance() {
        let index = ZoneIndex::build(&[square("VNN", 0.0, 0.0, 10.0, 10.0)]);
        // Slightly outside the eastern edge due to precision noise.
        assert_eq!(index.resolve(10.0000005, 5.0), Some("VNN"));
        // Well outside stays unmatched.
        assert_eq!(index.resolve(10.01, 5.0), None);
    }

    #[test]
    fn test_overlapping_zones_resolve_to_smallest_area() {
        let index = ZoneIndex::build(&[
            square("big", 0.0, 0.0, 10.0, 10.0),
            square("small", 4.0, 4.0, 6.0, 6.0),
        ]);
        assert_eq!(index.resolve(5.0, 5.0), Some("small"));
        assert_eq!(index.resolve(1.0, 1.0), Some("big"));
    }

    #[test]
    fn test_clip_mask_unions_disjoint_zones() {
        let mask = clip_mask(&[
            square("a", 0.0, 0.0, 1.0, 1.0),
            square("b", 5.0, 5.0, 6.0, 6.0),
        ])
        .unwrap();
        assert!((mask.unsigned_area() - 2.0).abs() < 1e-9);
        assert!(clip_mask(&[]).is_none());
    }
}
