//! Territory synthesis: one non-overlapping polygon per rep.
//!
//! Rep territories come from a Voronoi partition over the rep groups'
//! candidate centroids, clipped to the zone union when zones are supplied.
//! Geometric degeneracies never abort a run: colliding centroids are
//! perturbed apart, a failed Voronoi construction falls back to sequential
//! hull differencing, and a degenerate hull substitutes a small disk.

use std::collections::HashMap;

use geo::{
    Area, BooleanOps, BoundingRect, Centroid, ConvexHull, Coord, LineString, MultiPoint,
    MultiPolygon, Point, Polygon,
};
use voronator::VoronoiDiagram;
use voronator::delaunator::Point as SitePoint;

use crate::geoutil;
use crate::models::{AssignmentResult, ZonePolygon};
use crate::zones;

/// Radius of the disk substituted for a degenerate (line/point) hull.
pub const POINT_BUFFER_RADIUS_DEG: f64 = 0.01;

/// Margin added around the clip/site bounding box for the Voronoi envelope.
const ENVELOPE_MARGIN_DEG: f64 = 0.01;

const MAX_SEPARATION_ATTEMPTS: usize = 16;

/// One rep's territory polygon.
#[derive(Debug, Clone)]
pub struct Territory {
    pub rep_id: String,
    pub geometry: MultiPolygon<f64>,
}

struct RepGroup {
    rep_id: String,
    points: Vec<Point<f64>>,
}

/// Synthesize one territory per rep from an assignment result. Pure function
/// of the assigned candidates' points and rep ids; deterministic.
pub fn synthesize(result: &AssignmentResult, zones: Option<&[ZonePolygon]>) -> Vec<Territory> {
    let groups = group_by_rep(result);
    if groups.is_empty() {
        return Vec::new();
    }

    let clip = zones.and_then(zones::clip_mask);

    if groups.len() == 1 {
        let group = &groups[0];
        return clip_and_reduce(hull_or_disk(&group.points), clip.as_ref())
            .map(|geometry| Territory {
                rep_id: group.rep_id.clone(),
                geometry,
            })
            .into_iter()
            .collect();
    }

    let mut sites: Vec<(f64, f64)> = groups
        .iter()
        .map(|g| {
            let n = g.points.len() as f64;
            (
                g.points.iter().copied().map(Point::x).sum::<f64>() / n,
                g.points.iter().copied().map(Point::y).sum::<f64>() / n,
            )
        })
        .collect();
    ensure_minimum_separation(&mut sites);

    match voronoi_territories(&groups, &sites, clip.as_ref()) {
        Some(territories) => territories,
        None => {
            tracing::warn!(
                groups = groups.len(),
                "voronoi construction failed; falling back to sequential hull differencing"
            );
            sequential_difference(&groups, clip.as_ref())
        }
    }
}

/// Group assigned candidates by rep id, case-insensitively, preserving
/// first-seen order and the first-seen spelling of each id.
fn group_by_rep(result: &AssignmentResult) -> Vec<RepGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<RepGroup> = Vec::new();
    for assigned in &result.assigned {
        let key = assigned.rep_id.to_uppercase();
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(RepGroup {
                rep_id: assigned.rep_id.clone(),
                points: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].points.push(assigned.candidate.point);
    }
    groups
}

/// Convex hull of a point group, or a small disk when the hull degenerates to
/// a line or point.
fn hull_or_disk(points: &[Point<f64>]) -> MultiPolygon<f64> {
    let hull = MultiPoint::from(points.to_vec()).convex_hull();
    if hull.unsigned_area() > 0.0 {
        MultiPolygon(vec![hull])
    } else {
        MultiPolygon(vec![geoutil::disk(points[0], POINT_BUFFER_RADIUS_DEG)])
    }
}

/// Intersect with the clip mask (when present) and keep only polygonal
/// components; `None` when nothing polygonal remains.
fn clip_and_reduce(
    geometry: MultiPolygon<f64>,
    clip: Option<&MultiPolygon<f64>>,
) -> Option<MultiPolygon<f64>> {
    let clipped = match clip {
        Some(mask) => geometry.intersection(mask),
        None => geometry,
    };
    geoutil::polygonal_components(clipped)
}

/// Voronoi construction needs distinct sites: perturb colliding centroids
/// outward along an expanding spiral until separated.
fn ensure_minimum_separation(sites: &mut [(f64, f64)]) {
    if sites.len() < 2 {
        return;
    }

    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for (x, y) in sites.iter() {
        min_x = min_x.min(*x);
        min_y = min_y.min(*y);
        max_x = max_x.max(*x);
        max_y = max_y.max(*y);
    }
    let span = (max_x - min_x).max(max_y - min_y);
    let tolerance = (span * 1e-9).max(1e-7);

    for i in 0..sites.len() {
        let origin = sites[i];
        let mut current = origin;
        let mut attempt = 0;
        while has_neighbor_within(sites, i, current, tolerance)
            && attempt < MAX_SEPARATION_ATTEMPTS
        {
            attempt += 1;
            let angle = attempt as f64 * std::f64::consts::FRAC_PI_4;
            let radius = tolerance * attempt as f64;
            current = (
                origin.0 + angle.cos() * radius,
                origin.1 + angle.sin() * radius,
            );
        }
        sites[i] = current;
    }
}

fn has_neighbor_within(
    sites: &[(f64, f64)],
    current_index: usize,
    candidate: (f64, f64),
    tolerance: f64,
) -> bool {
    sites.iter().enumerate().any(|(i, site)| {
        i != current_index
            && (candidate.0 - site.0).hypot(candidate.1 - site.1) <= tolerance
    })
}

/// Partition by Voronoi cells over the group centroids. Each clipped cell is
/// attributed to the group whose (separated) site lies nearest the cell
/// centroid, which stays robust when cell order cannot be tracked exactly.
/// Two sites cannot be triangulated, so that case splits the envelope along
/// the perpendicular bisector instead. Returns `None` when the diagram cannot
/// be constructed.
fn voronoi_territories(
    groups: &[RepGroup],
    sites: &[(f64, f64)],
    clip: Option<&MultiPolygon<f64>>,
) -> Option<Vec<Territory>> {
    let envelope = clip
        .and_then(BoundingRect::bounding_rect)
        .map(|rect| (rect.min().x, rect.min().y, rect.max().x, rect.max().y))
        .unwrap_or_else(|| {
            let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
            let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
            for (x, y) in sites {
                min_x = min_x.min(*x);
                min_y = min_y.min(*y);
                max_x = max_x.max(*x);
                max_y = max_y.max(*y);
            }
            (min_x, min_y, max_x, max_y)
        });
    let min = (
        envelope.0 - ENVELOPE_MARGIN_DEG,
        envelope.1 - ENVELOPE_MARGIN_DEG,
    );
    let max = (
        envelope.2 + ENVELOPE_MARGIN_DEG,
        envelope.3 + ENVELOPE_MARGIN_DEG,
    );

    let cells: Vec<Vec<Coord<f64>>> = if sites.len() == 2 {
        two_site_cells(sites, min, max)?
    } else {
        let diagram = VoronoiDiagram::<SitePoint>::from_tuple(&min, &max, sites)?;
        diagram
            .cells()
            .iter()
            .map(|cell| {
                cell.points()
                    .iter()
                    .map(|p| Coord { x: p.x, y: p.y })
                    .collect()
            })
            .collect()
    };

    let mut territories = Vec::new();
    for ring in cells {
        if ring.len() < 3 {
            continue;
        }
        let cell_polygon = Polygon::new(LineString::from(ring), vec![]);
        let Some(geometry) = clip_and_reduce(MultiPolygon(vec![cell_polygon]), clip) else {
            continue;
        };
        let Some(cell_centroid) = geometry.centroid() else {
            continue;
        };

        let mut nearest: Option<(usize, f64)> = None;
        for (i, site) in sites.iter().enumerate() {
            let distance = (site.0 - cell_centroid.x()).hypot(site.1 - cell_centroid.y());
            if nearest.is_none_or(|(_, best)| distance < best) {
                nearest = Some((i, distance));
            }
        }
        let Some((group_index, _)) = nearest else {
            continue;
        };

        territories.push(Territory {
            rep_id: groups[group_index].rep_id.clone(),
            geometry,
        });
    }
    Some(territories)
}

/// Voronoi diagram of exactly two sites: the envelope rectangle split along
/// the perpendicular bisector of the sites. `None` when the separated sites
/// still coincide.
fn two_site_cells(
    sites: &[(f64, f64)],
    min: (f64, f64),
    max: (f64, f64),
) -> Option<Vec<Vec<Coord<f64>>>> {
    let (a, b) = (sites[0], sites[1]);
    if a == b {
        return None;
    }
    let rect = vec![
        Coord { x: min.0, y: min.1 },
        Coord { x: max.0, y: min.1 },
        Coord { x: max.0, y: max.1 },
        Coord { x: min.0, y: max.1 },
    ];
    Some(vec![
        half_plane_clip(&rect, a, b),
        half_plane_clip(&rect, b, a),
    ])
}

/// Sutherland-Hodgman clip of a ring to the half-plane of points at least as
/// close to `near` as to `far`.
fn half_plane_clip(ring: &[Coord<f64>], near: (f64, f64), far: (f64, f64)) -> Vec<Coord<f64>> {
    let direction = (far.0 - near.0, far.1 - near.1);
    let midpoint = ((near.0 + far.0) / 2.0, (near.1 + far.1) / 2.0);
    // Signed distance along the site axis; <= 0 is the `near` side.
    let side = |p: &Coord<f64>| direction.0 * (p.x - midpoint.0) + direction.1 * (p.y - midpoint.1);

    let mut clipped = Vec::with_capacity(ring.len() + 1);
    for i in 0..ring.len() {
        let current = ring[i];
        let previous = ring[(i + ring.len() - 1) % ring.len()];
        let (side_current, side_previous) = (side(&current), side(&previous));

        if side_previous <= 0.0 && side_current > 0.0 || side_previous > 0.0 && side_current <= 0.0
        {
            let t = side_previous / (side_previous - side_current);
            clipped.push(Coord {
                x: previous.x + t * (current.x - previous.x),
                y: previous.y + t * (current.y - previous.y),
            });
        }
        if side_current <= 0.0 {
            clipped.push(current);
        }
    }
    clipped
}

/// Fallback when Voronoi construction fails: walk groups in rep-id order,
/// take each group's hull clipped to the mask, and subtract everything
/// already emitted. Guarantees no inter-rep overlap at the cost of
/// order-dependent boundary shapes.
fn sequential_difference(
    groups: &[RepGroup],
    clip: Option<&MultiPolygon<f64>>,
) -> Vec<Territory> {
    let mut ordered: Vec<&RepGroup> = groups.iter().collect();
    ordered.sort_by(|a, b| a.rep_id.to_uppercase().cmp(&b.rep_id.to_uppercase()));

    let mut consumed: Option<MultiPolygon<f64>> = None;
    let mut territories = Vec::new();
    for group in ordered {
        let mut territory = hull_or_disk(&group.points);
        if let Some(mask) = clip {
            territory = territory.intersection(mask);
        }
        if let Some(prior) = &consumed {
            territory = territory.difference(prior);
        }
        let Some(geometry) = geoutil::polygonal_components(territory) else {
            continue;
        };
        consumed = Some(match consumed {
            None => geometry.clone(),
            Some(prior) => prior.union(&geometry),
        });
        territories.push(Territory {
            rep_id: group.rep_id.clone(),
            geometry,
        });
    }
    territories
}
