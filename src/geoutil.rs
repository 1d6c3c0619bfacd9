//! Small geometry helpers shared across the pipeline.
//!
//! Great-circle distance uses a straight haversine on a spherical earth; it is
//! a routing-cost proxy, not a road distance.

use geo::{Area, Coord, LineString, MultiPolygon, Point, Polygon};

/// Earth radius in miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Segment count for the disk substituted for degenerate hulls.
const DISK_SEGMENTS: usize = 32;

/// Great-circle distance in miles between two (lon, lat) points.
pub fn haversine_miles(a: Point<f64>, b: Point<f64>) -> f64 {
    let d_lat = (b.y() - a.y()).to_radians();
    let d_lon = (b.x() - a.x()).to_radians();
    let origin_lat = a.y().to_radians();
    let dest_lat = b.y().to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + origin_lat.cos() * dest_lat.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}

/// Whether a latitude/longitude pair is inside the valid coordinate domain.
pub fn is_valid_coordinate(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

/// A small regular polygon approximating a disk around `center`, used when a
/// convex hull degenerates to a line or point.
pub fn disk(center: Point<f64>, radius: f64) -> Polygon<f64> {
    let ring: Vec<Coord<f64>> = (0..DISK_SEGMENTS)
        .map(|i| {
            let angle = (i as f64) * std::f64::consts::TAU / (DISK_SEGMENTS as f64);
            Coord {
                x: center.x() + radius * angle.cos(),
                y: center.y() + radius * angle.sin(),
            }
        })
        .collect();
    Polygon::new(LineString::from(ring), vec![])
}

/// Reduce a geometry to its polygonal components: drop zero-area residue left
/// by intersections and return `None` when nothing polygonal remains.
pub fn polygonal_components(geometry: MultiPolygon<f64>) -> Option<MultiPolygon<f64>> {
    let polygons: Vec<Polygon<f64>> = geometry
        .into_iter()
        .filter(|p| p.unsigned_area() > 0.0)
        .collect();
    if polygons.is_empty() {
        None
    } else {
        Some(MultiPolygon(polygons))
    }
}

/// Shortest euclidean distance from a point to a multipolygon boundary, in
/// coordinate units. Zero when the point lies on the boundary.
pub fn distance_to_boundary(point: Point<f64>, geometry: &MultiPolygon<f64>) -> f64 {
    let mut best = f64::INFINITY;
    for polygon in geometry {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            for segment in ring.lines() {
                best = best.min(point_segment_distance(point, segment.start, segment.end));
            }
        }
    }
    best
}

fn point_segment_distance(p: Point<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.x() - a.x) * dx + (p.y() - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    ((p.x() - cx).powi(2) + (p.y() - cy).powi(2)).sqrt()
}
