//! Export shapes for downstream collaborators.
//!
//! Produces the tabular assignment/summary rows, the run-log payload, and the
//! territory GeoJSON feature collection. Callers own the actual file handles;
//! everything here writes to `io::Write` or returns in-memory values, so a
//! failed run never leaves a partial file behind.

use std::io::Write;

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};
use serde::Serialize;

use crate::models::{AssignedCandidate, AssignmentResult, OverallMetrics, RawRecord, RepMetrics,
    ZonePolygon};
use crate::territory;

/// One line of the per-business assignment table.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentRow {
    pub rep_id: String,
    pub entity_id: String,
    pub address: String,
    pub city: String,
    pub county: String,
    pub state: String,
    pub zip: String,
    pub building_type: String,
    pub score: f64,
    pub distance_proxy: f64,
}

impl AssignmentRow {
    fn from_assigned(assigned: &AssignedCandidate) -> Self {
        let source = &assigned.candidate.source;
        Self {
            rep_id: assigned.rep_id.clone(),
            entity_id: source.name.clone(),
            address: source.address.clone(),
            city: source.city.clone(),
            county: source.county.clone(),
            state: source.state.clone(),
            zip: source.zip.clone(),
            building_type: source.building_type_bucket().label().to_string(),
            score: assigned.candidate.score,
            distance_proxy: assigned.distance_proxy_miles,
        }
    }
}

pub fn assignment_rows(result: &AssignmentResult) -> Vec<AssignmentRow> {
    result.assigned.iter().map(AssignmentRow::from_assigned).collect()
}

pub fn write_assignments_csv<W: Write>(writer: W, result: &AssignmentResult) -> csv::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in assignment_rows(result) {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// One summary row per active rep, straight from [`RepMetrics`].
pub fn write_summary_csv<W: Write>(writer: W, result: &AssignmentResult) -> csv::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for metrics in &result.rep_metrics {
        csv_writer.serialize(metrics)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Point shape in the run log: explicit latitude/longitude fields rather than
/// an x/y pair, so the log is unambiguous for non-GIS consumers.
#[derive(Debug, Clone, Serialize)]
pub struct PointShape {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunLogCandidate {
    pub source: RawRecord,
    pub point: PointShape,
    pub zone_name: String,
    pub score: f64,
    pub rep_id: String,
    pub distance_proxy_miles: f64,
}

/// The full audit payload for one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunLog {
    pub run_id: String,
    pub assigned: Vec<RunLogCandidate>,
    pub rep_metrics: Vec<RepMetrics>,
    pub overall: OverallMetrics,
}

pub fn run_log(result: &AssignmentResult) -> RunLog {
    RunLog {
        run_id: result.run_id.clone(),
        assigned: result
            .assigned
            .iter()
            .map(|assigned| RunLogCandidate {
                source: assigned.candidate.source.clone(),
                point: PointShape {
                    latitude: assigned.candidate.point.y(),
                    longitude: assigned.candidate.point.x(),
                },
                zone_name: assigned.candidate.zone_name.clone(),
                score: assigned.candidate.score,
                rep_id: assigned.rep_id.clone(),
                distance_proxy_miles: assigned.distance_proxy_miles,
            })
            .collect(),
        rep_metrics: result.rep_metrics.clone(),
        overall: result.overall.clone(),
    }
}

pub fn write_run_log_json<W: Write>(writer: W, result: &AssignmentResult) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, &run_log(result))
}

/// Build the territory feature collection: one polygon feature per rep tagged
/// `rep_id`, optionally followed by one point feature per assignment tagged
/// `feature_type=assignment`.
pub fn territory_feature_collection(
    result: &AssignmentResult,
    zones: Option<&[ZonePolygon]>,
    include_assignment_points: bool,
) -> FeatureCollection {
    let mut features: Vec<Feature> = territory::synthesize(result, zones)
        .into_iter()
        .map(|territory| {
            let mut properties = JsonObject::new();
            properties.insert("rep_id".to_string(), JsonValue::from(territory.rep_id));
            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::from(&territory.geometry))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    if include_assignment_points {
        features.extend(result.assigned.iter().map(assignment_point_feature));
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn assignment_point_feature(assigned: &AssignedCandidate) -> Feature {
    let source = &assigned.candidate.source;
    let point = assigned.candidate.point;

    let location = [&source.address, &source.city, &source.state, &source.zip]
        .into_iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    let mut properties = JsonObject::new();
    properties.insert("feature_type".to_string(), JsonValue::from("assignment"));
    properties.insert("rep_id".to_string(), JsonValue::from(assigned.rep_id.clone()));
    properties.insert("latitude".to_string(), JsonValue::from(point.y()));
    properties.insert("longitude".to_string(), JsonValue::from(point.x()));
    properties.insert("location".to_string(), JsonValue::from(location));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![point.x(), point.y()]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}
