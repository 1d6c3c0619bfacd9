//! Core domain types for territory planning.
//!
//! Records flow through three stages: raw geocoded records become scored,
//! zone-resolved candidates; candidates are assigned to reps; assignments are
//! summarized into per-rep and overall metrics. Builder output is immutable;
//! the assignment stage produces a separate record per candidate rather than
//! mutating the candidate in place.

use std::collections::{HashMap, HashSet};

use geo::{MultiPolygon, Point};
use serde::Serialize;

/// One raw geocoded business record as delivered by the ingestion collaborator.
///
/// Immutable once read. Parsing file bytes into this shape is out of scope;
/// only the owner-flag normalization rule lives here because it is part of the
/// record contract, not of any particular file format.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RawRecord {
    pub entity_category: String,
    pub entity_category_id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub city: String,
    pub county: String,
    pub state: String,
    pub zip: String,
    pub building_type: String,
    pub number_of_addresses: u32,
    pub owner_company_flag: bool,
}

impl RawRecord {
    /// Classify this record's raw building-type text into a bucket.
    pub fn building_type_bucket(&self) -> BuildingTypeBucket {
        BuildingTypeBucket::from_raw(&self.building_type)
    }
}

/// Normalize an owner-company flag arriving as free text.
///
/// `1`/`Y`/`Yes`/`True` (case-insensitive, trimmed) mean true; anything else,
/// including blank, means false.
pub fn parse_owner_company_flag(raw: &str) -> bool {
    let value = raw.trim();
    value.eq_ignore_ascii_case("1")
        || value.eq_ignore_ascii_case("y")
        || value.eq_ignore_ascii_case("yes")
        || value.eq_ignore_ascii_case("true")
}

/// Building-type classification used for both filtering and scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BuildingTypeBucket {
    LargeBusiness,
    MediumBusiness,
    SmallBusiness,
    Unknown,
    Blanks,
}

impl BuildingTypeBucket {
    /// Blank text maps to `(Blanks)`, unrecognized non-blank text to `Unknown`,
    /// recognized labels pass through.
    pub fn from_raw(text: &str) -> Self {
        let normalized = text.trim();
        if normalized.is_empty() {
            return Self::Blanks;
        }
        if normalized.eq_ignore_ascii_case("large business") {
            Self::LargeBusiness
        } else if normalized.eq_ignore_ascii_case("medium business") {
            Self::MediumBusiness
        } else if normalized.eq_ignore_ascii_case("small business") {
            Self::SmallBusiness
        } else if normalized.eq_ignore_ascii_case("unknown") {
            Self::Unknown
        } else if normalized.eq_ignore_ascii_case("(blanks)") {
            Self::Blanks
        } else {
            Self::Unknown
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::LargeBusiness => "Large Business",
            Self::MediumBusiness => "Medium Business",
            Self::SmallBusiness => "Small Business",
            Self::Unknown => "Unknown",
            Self::Blanks => "(Blanks)",
        }
    }

    pub const ALL: [Self; 5] = [
        Self::LargeBusiness,
        Self::MediumBusiness,
        Self::SmallBusiness,
        Self::Unknown,
        Self::Blanks,
    ];
}

/// A named zone polygon. Zones may overlap or be disjoint; they serve both as
/// containment regions for candidates and as the clip mask for territories.
#[derive(Debug, Clone)]
pub struct ZonePolygon {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

/// A field representative. Only active reps participate in assignment.
#[derive(Debug, Clone, Serialize)]
pub struct RepRecord {
    pub rep_id: String,
    pub rep_name: String,
    pub home_lat: f64,
    pub home_lon: f64,
    pub active: bool,
}

impl RepRecord {
    /// Build a synthetic roster of `count` active reps homed at the origin,
    /// for runs where the operator supplies a head count instead of a roster.
    pub fn synthetic_roster(count: usize) -> Vec<Self> {
        (1..=count)
            .map(|i| Self {
                rep_id: format!("rep-{i}"),
                rep_name: format!("Rep {i}"),
                home_lat: 0.0,
                home_lon: 0.0,
                active: true,
            })
            .collect()
    }
}

/// Filter configuration for the candidate builder.
///
/// Empty city/county allow-lists mean no restriction. An empty bucket set is a
/// configuration error and fails the build up front.
#[derive(Debug, Clone)]
pub struct FilterOptions {
    pub included_buckets: HashSet<BuildingTypeBucket>,
    pub city_filter: HashSet<String>,
    pub county_filter: HashSet<String>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            included_buckets: BuildingTypeBucket::ALL.into_iter().collect(),
            city_filter: HashSet::new(),
            county_filter: HashSet::new(),
        }
    }
}

/// Scoring configuration. Buckets missing from the points table score 1.
#[derive(Debug, Clone)]
pub struct ScoringOptions {
    pub building_type_points: HashMap<BuildingTypeBucket, f64>,
    pub use_address_multiplier: bool,
    pub address_multiplier_factor: f64,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        let building_type_points = HashMap::from([
            (BuildingTypeBucket::LargeBusiness, 10.0),
            (BuildingTypeBucket::MediumBusiness, 6.0),
            (BuildingTypeBucket::SmallBusiness, 3.0),
            (BuildingTypeBucket::Unknown, 1.0),
            (BuildingTypeBucket::Blanks, 1.0),
        ]);
        Self {
            building_type_points,
            use_address_multiplier: false,
            address_multiplier_factor: 0.1,
        }
    }
}

/// Tuning weights for the assignment objective and fairness reporting.
#[derive(Debug, Clone)]
pub struct AssignmentOptions {
    pub fairness_tolerance_percent: f64,
    pub opportunity_variance_weight: f64,
    pub drive_penalty_weight: f64,
}

impl Default for AssignmentOptions {
    fn default() -> Self {
        Self {
            fairness_tolerance_percent: 5.0,
            opportunity_variance_weight: 0.65,
            drive_penalty_weight: 0.25,
        }
    }
}

/// Per-stage filter counters for operator visibility.
///
/// Counters are incremented by the first failing check only, so the numbers
/// reflect the documented filter order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub total_records_read: usize,
    pub invalid_coordinate_skipped: usize,
    pub non_business_skipped: usize,
    pub building_type_filtered: usize,
    pub city_filtered: usize,
    pub county_filtered: usize,
    pub exclusion_filtered: usize,
    pub duplicate_filtered: usize,
    pub zone_not_matched_filtered: usize,
    pub included_candidates: usize,
}

/// A business location that survived filtering: scored and zone-tagged.
///
/// Builder output; immutable. The point is stored as (longitude, latitude) in
/// the x/y convention of the zone geometry.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub source: RawRecord,
    pub point: Point<f64>,
    pub zone_name: String,
    pub score: f64,
}

/// Candidate builder output: the surviving candidates plus diagnostics.
#[derive(Debug, Clone, Default)]
pub struct CandidateBuildResult {
    pub candidates: Vec<ScoredCandidate>,
    pub diagnostics: Diagnostics,
}

/// A candidate after assignment: the immutable scored candidate plus the rep
/// it went to and the great-circle distance proxy to that rep's home.
#[derive(Debug, Clone)]
pub struct AssignedCandidate {
    pub candidate: ScoredCandidate,
    pub rep_id: String,
    pub distance_proxy_miles: f64,
}

/// Per-rep aggregate metrics for one assignment run.
#[derive(Debug, Clone, Serialize)]
pub struct RepMetrics {
    pub rep_id: String,
    pub rep_name: String,
    pub weighted_score: f64,
    pub target_score: f64,
    pub percent_to_target: f64,
    pub business_count: usize,
    pub small_business_count: usize,
    pub medium_business_count: usize,
    pub large_business_count: usize,
    pub average_distance: f64,
    pub max_distance: f64,
    pub within_fairness_tolerance: bool,
    /// Reserved for a future spatial-contiguity check; always true today.
    pub contiguity_pass: bool,
}

/// Run-level fairness metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OverallMetrics {
    /// Coefficient of variation of weighted scores across reps.
    pub fairness_index: f64,
    pub max_imbalance_percent: f64,
    pub included_count: usize,
    pub excluded_count: usize,
}

/// The complete output of one assignment run. Built once, immutable after.
#[derive(Debug, Clone)]
pub struct AssignmentResult {
    pub run_id: String,
    pub assigned: Vec<AssignedCandidate>,
    pub rep_metrics: Vec<RepMetrics>,
    pub overall: OverallMetrics,
}
