//! Test fixtures for territory-planner.
//!
//! Provides builders for raw records, zones and reps, plus a bank of real
//! Grand Rapids area business locations for realistic pipeline tests.
#![allow(dead_code)]

pub mod grand_rapids_locations;

pub use grand_rapids_locations::*;

use std::collections::HashSet;

use geo::{MultiPolygon, polygon};
use territory_planner::models::{
    AssignedCandidate, AssignmentResult, OverallMetrics, RawRecord, RepRecord, ScoredCandidate,
    ZonePolygon,
};

/// A business record that passes every default filter, placed at (lat, lon).
pub fn business_record(name: &str, lat: f64, lon: f64) -> RawRecord {
    RawRecord {
        entity_category: "Business".to_string(),
        entity_category_id: "business".to_string(),
        name: name.to_string(),
        latitude: lat,
        longitude: lon,
        address: "1 Main St".to_string(),
        city: "Grand Rapids".to_string(),
        county: "Kent".to_string(),
        state: "MI".to_string(),
        zip: "49503".to_string(),
        building_type: "Small Business".to_string(),
        number_of_addresses: 1,
        owner_company_flag: false,
    }
}

pub fn record_with_building_type(name: &str, lat: f64, lon: f64, building_type: &str) -> RawRecord {
    RawRecord {
        building_type: building_type.to_string(),
        ..business_record(name, lat, lon)
    }
}

/// An axis-aligned rectangular zone in (lon, lat) coordinates.
pub fn square_zone(name: &str, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> ZonePolygon {
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

pub fn active_rep(rep_id: &str, home_lat: f64, home_lon: f64) -> RepRecord {
    RepRecord {
        rep_id: rep_id.to_string(),
        rep_name: format!("Rep {rep_id}"),
        home_lat,
        home_lon,
        active: true,
    }
}

pub fn exclusion_set(entries: &[&str]) -> HashSet<String> {
    entries.iter().map(|e| e.to_string()).collect()
}

/// A scored candidate at (lon, lat) without going through the builder.
pub fn scored_candidate(name: &str, lon: f64, lat: f64, score: f64) -> ScoredCandidate {
    ScoredCandidate {
        source: business_record(name, lat, lon),
        point: geo::Point::new(lon, lat),
        zone_name: "VNN".to_string(),
        score,
    }
}

/// An already-assigned candidate, for territory/export tests that do not need
/// a full assignment run.
pub fn assigned_candidate(name: &str, lon: f64, lat: f64, rep_id: &str) -> AssignedCandidate {
    AssignedCandidate {
        candidate: scored_candidate(name, lon, lat, 1.0),
        rep_id: rep_id.to_string(),
        distance_proxy_miles: 0.0,
    }
}

/// Wrap assigned candidates into a minimal result for synthesis/export tests.
pub fn result_with_assigned(assigned: Vec<AssignedCandidate>) -> AssignmentResult {
    AssignmentResult {
        run_id: "20250825120000".to_string(),
        assigned,
        rep_metrics: Vec::new(),
        overall: OverallMetrics::default(),
    }
}
