//! Candidate builder: filter, dedup, zone-resolve and score raw records.
//!
//! Checks run in a fixed order and the first failing check both skips the
//! record and increments its diagnostic counter, so the counters reflect why
//! records dropped out, stage by stage.

use std::collections::HashSet;

use crate::error::PlannerError;
use crate::geoutil;
use crate::models::{
    CandidateBuildResult, Diagnostics, FilterOptions, RawRecord, ScoredCandidate, ScoringOptions,
    ZonePolygon,
};
use crate::traits::{CancelToken, ScoringFilterEngine};
use crate::zones::ZoneIndex;
use geo::Point;

/// Production [`ScoringFilterEngine`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateBuilder;

impl CandidateBuilder {
    pub fn new() -> Self {
        Self
    }
}

impl ScoringFilterEngine for CandidateBuilder {
    fn build_candidates<I>(
        &self,
        records: I,
        zones: &[ZonePolygon],
        filters: &FilterOptions,
        scoring: &ScoringOptions,
        exclusion_sets: &[HashSet<String>],
        cancel: &CancelToken,
    ) -> Result<CandidateBuildResult, PlannerError>
    where
        I: IntoIterator<Item = RawRecord>,
    {
        if filters.included_buckets.is_empty() {
            return Err(PlannerError::NoBuildingTypesSelected);
        }

        let zone_index = ZoneIndex::build(zones);
        // Case-insensitive comparison via explicit uppercase keys.
        let city_filter: HashSet<String> =
            filters.city_filter.iter().map(|c| c.to_uppercase()).collect();
        let county_filter: HashSet<String> =
            filters.county_filter.iter().map(|c| c.to_uppercase()).collect();

        let mut seen_keys: HashSet<String> = HashSet::new();
        let mut candidates = Vec::new();
        let mut diagnostics = Diagnostics::default();

        for record in records {
            cancel.check()?;
            diagnostics.total_records_read += 1;

            if !geoutil::is_valid_coordinate(record.latitude, record.longitude) {
                diagnostics.invalid_coordinate_skipped += 1;
                continue;
            }

            let category = record.entity_category.trim();
            if !category.is_empty() && !category.eq_ignore_ascii_case("business") {
                diagnostics.non_business_skipped += 1;
                continue;
            }

            let bucket = record.building_type_bucket();
            if !filters.included_buckets.contains(&bucket) {
                diagnostics.building_type_filtered += 1;
                continue;
            }

            if !city_filter.is_empty() && !city_filter.contains(&record.city.to_uppercase()) {
                diagnostics.city_filtered += 1;
                continue;
            }

            if !county_filter.is_empty() && !county_filter.contains(&record.county.to_uppercase()) {
                diagnostics.county_filtered += 1;
                continue;
            }

            let normalized_address = crate::address::normalize(&record.address);
            let name_key = record.name.trim().to_uppercase();
            let excluded = exclusion_sets.iter().any(|set| {
                set.contains(&normalized_address)
                    || (!name_key.is_empty() && set.contains(&name_key))
            });
            if excluded {
                diagnostics.exclusion_filtered += 1;
                continue;
            }

            let dedupe_key = if name_key.is_empty() {
                format!(
                    "{}|{}|{}|{:.6}|{:.6}",
                    normalized_address,
                    record.city.to_uppercase(),
                    record.zip.to_uppercase(),
                    record.latitude,
                    record.longitude
                )
            } else {
                name_key
            };
            if !seen_keys.insert(dedupe_key) {
                diagnostics.duplicate_filtered += 1;
                continue;
            }

            // Zone lookup treats the record as (lon, lat); if that misses,
            // retry with the axes swapped to tolerate transposed source
            // columns, and keep the swapped point when the retry matches.
            let mut point = Point::new(record.longitude, record.latitude);
            let mut zone = zone_index.resolve(point.x(), point.y());
            if zone.is_none() {
                let swapped = Point::new(record.latitude, record.longitude);
                zone = zone_index.resolve(swapped.x(), swapped.y());
                if zone.is_some() {
                    point = swapped;
                }
            }
            let Some(zone_name) = zone else {
                diagnostics.zone_not_matched_filtered += 1;
                continue;
            };

            let base = scoring
                .building_type_points
                .get(&bucket)
                .copied()
                .unwrap_or(1.0);
            let score = if scoring.use_address_multiplier {
                base * (1.0 + f64::from(record.number_of_addresses) * scoring.address_multiplier_factor)
            } else {
                base
            };

            let zone_name = zone_name.to_string();
            candidates.push(ScoredCandidate {
                source: record,
                point,
                zone_name,
                score,
            });
        }

        diagnostics.included_candidates = candidates.len();
        tracing::info!(
            read = diagnostics.total_records_read,
            included = diagnostics.included_candidates,
            duplicates = diagnostics.duplicate_filtered,
            zone_unmatched = diagnostics.zone_not_matched_filtered,
            "candidate build complete"
        );

        Ok(CandidateBuildResult {
            candidates,
            diagnostics,
        })
    }

    fn total_weighted_opportunity(&self, candidates: &[ScoredCandidate]) -> f64 {
        candidates.iter().map(|c| c.score).sum()
    }
}
