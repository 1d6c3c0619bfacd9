//! Assignment engine: partition candidates among active reps.
//!
//! The normal mode is a greedy pass over candidates in descending score
//! order, choosing for each the rep with the lowest combined distance/load
//! objective. When every active rep shares one home location the distance
//! term is meaningless and produces arbitrary ties, so the engine switches to
//! angular slicing around the candidate centroid instead. Both modes are
//! deterministic heuristics, not optimal partitions.

use std::collections::HashMap;

use geo::Point;

use crate::error::PlannerError;
use crate::geoutil;
use crate::models::{
    AssignedCandidate, AssignmentOptions, AssignmentResult, BuildingTypeBucket, OverallMetrics,
    RepMetrics, RepRecord, ScoredCandidate,
};
use crate::traits::{AssignmentService, CancelToken};

/// Production [`AssignmentService`] implementing the initial (greedy)
/// territory split.
#[derive(Debug, Clone, Copy, Default)]
pub struct InitialAssignment;

impl InitialAssignment {
    pub fn new() -> Self {
        Self
    }
}

impl AssignmentService for InitialAssignment {
    fn assign(
        &self,
        candidates: Vec<ScoredCandidate>,
        reps: &[RepRecord],
        options: &AssignmentOptions,
        cancel: &CancelToken,
    ) -> Result<AssignmentResult, PlannerError> {
        let active: Vec<&RepRecord> = reps.iter().filter(|r| r.active).collect();
        if active.is_empty() {
            return Err(PlannerError::NoActiveReps);
        }
        if candidates.is_empty() {
            return Err(PlannerError::NoCandidates);
        }

        let total: f64 = candidates.iter().map(|c| c.score).sum();
        let target = total / active.len() as f64;

        let assigned = if homes_collapse_to_single_point(&active) {
            tracing::debug!(
                reps = active.len(),
                "all active rep homes identical; using angular-slice assignment"
            );
            assign_angular(candidates, &active, target, cancel)?
        } else {
            assign_greedy(candidates, &active, target, options, cancel)?
        };

        let rep_metrics = build_rep_metrics(&assigned, &active, target, options);
        let overall = build_overall_metrics(&rep_metrics, assigned.len());
        tracing::info!(
            candidates = assigned.len(),
            reps = active.len(),
            fairness_index = overall.fairness_index,
            "assignment run complete"
        );

        Ok(AssignmentResult {
            run_id: chrono::Utc::now().format("%Y%m%d%H%M%S").to_string(),
            assigned,
            rep_metrics,
            overall,
        })
    }
}

/// Degenerate-input detection: every active rep home, rounded to six decimal
/// places, collapses to one distinct location.
fn homes_collapse_to_single_point(active: &[&RepRecord]) -> bool {
    let mut distinct: Option<String> = None;
    for rep in active {
        let key = format!("{:.6},{:.6}", rep.home_lat, rep.home_lon);
        match &distinct {
            None => distinct = Some(key),
            Some(first) if *first != key => return false,
            Some(_) => {}
        }
    }
    true
}

/// Angular-slice mode: sort candidates by polar angle around their centroid
/// and hand each rep a contiguous slice worth one equal share of score. The
/// last rep absorbs any remainder.
fn assign_angular(
    candidates: Vec<ScoredCandidate>,
    active: &[&RepRecord],
    target: f64,
    cancel: &CancelToken,
) -> Result<Vec<AssignedCandidate>, PlannerError> {
    let count = candidates.len() as f64;
    let centroid_x: f64 = candidates.iter().map(|c| c.point.x()).sum::<f64>() / count;
    let centroid_y: f64 = candidates.iter().map(|c| c.point.y()).sum::<f64>() / count;

    let mut ordered = candidates;
    ordered.sort_by(|a, b| {
        let angle_a = (a.point.y() - centroid_y).atan2(a.point.x() - centroid_x);
        let angle_b = (b.point.y() - centroid_y).atan2(b.point.x() - centroid_x);
        angle_a.total_cmp(&angle_b)
    });

    let mut assigned = Vec::with_capacity(ordered.len());
    let mut rep_index = 0usize;
    let mut load = 0.0f64;
    for candidate in ordered {
        cancel.check()?;
        let rep = active[rep_index];
        let home = Point::new(rep.home_lon, rep.home_lat);
        let distance = geoutil::haversine_miles(home, candidate.point);
        load += candidate.score;
        assigned.push(AssignedCandidate {
            candidate,
            rep_id: rep.rep_id.clone(),
            distance_proxy_miles: distance,
        });
        if load >= target && rep_index + 1 < active.len() {
            rep_index += 1;
            load = 0.0;
        }
    }
    Ok(assigned)
}

/// Greedy mode: process candidates largest score first so a late low-value
/// candidate cannot push an otherwise balanced rep far over target; pick per
/// candidate the rep with the strictly smallest distance/overload objective.
/// Ties keep the first rep in roster order.
fn assign_greedy(
    candidates: Vec<ScoredCandidate>,
    active: &[&RepRecord],
    target: f64,
    options: &AssignmentOptions,
    cancel: &CancelToken,
) -> Result<Vec<AssignedCandidate>, PlannerError> {
    let mut ordered = candidates;
    ordered.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut loads: HashMap<String, f64> = active
        .iter()
        .map(|r| (r.rep_id.to_uppercase(), 0.0))
        .collect();

    let mut assigned = Vec::with_capacity(ordered.len());
    for candidate in ordered {
        cancel.check()?;

        let mut best: Option<(&RepRecord, f64, f64)> = None;
        for rep in active {
            let home = Point::new(rep.home_lon, rep.home_lat);
            let distance = geoutil::haversine_miles(home, candidate.point);
            let load = loads[&rep.rep_id.to_uppercase()];
            let overload = (load - target).max(0.0);
            let objective = distance * options.drive_penalty_weight
                + overload * options.opportunity_variance_weight;
            let better = match best {
                None => true,
                Some((_, _, best_objective)) => objective < best_objective,
            };
            if better {
                best = Some((rep, distance, objective));
            }
        }

        // `active` is non-empty, so a best rep always exists.
        let Some((rep, distance, _)) = best else {
            return Err(PlannerError::NoActiveReps);
        };
        if let Some(load) = loads.get_mut(&rep.rep_id.to_uppercase()) {
            *load += candidate.score;
        }
        assigned.push(AssignedCandidate {
            candidate,
            rep_id: rep.rep_id.clone(),
            distance_proxy_miles: distance,
        });
    }
    Ok(assigned)
}

fn build_rep_metrics(
    assigned: &[AssignedCandidate],
    active: &[&RepRecord],
    target: f64,
    options: &AssignmentOptions,
) -> Vec<RepMetrics> {
    active
        .iter()
        .map(|rep| {
            let mine: Vec<&AssignedCandidate> = assigned
                .iter()
                .filter(|a| a.rep_id.eq_ignore_ascii_case(&rep.rep_id))
                .collect();

            let weighted: f64 = mine.iter().map(|a| a.candidate.score).sum();
            let percent_to_target = if target == 0.0 {
                0.0
            } else {
                (weighted - target) / target * 100.0
            };

            let bucket_count = |bucket: BuildingTypeBucket| {
                mine.iter()
                    .filter(|a| a.candidate.source.building_type_bucket() == bucket)
                    .count()
            };

            let (average_distance, max_distance) = if mine.is_empty() {
                (0.0, 0.0)
            } else {
                let sum: f64 = mine.iter().map(|a| a.distance_proxy_miles).sum();
                let max = mine
                    .iter()
                    .map(|a| a.distance_proxy_miles)
                    .fold(0.0f64, f64::max);
                (sum / mine.len() as f64, max)
            };

            RepMetrics {
                rep_id: rep.rep_id.clone(),
                rep_name: rep.rep_name.clone(),
                weighted_score: weighted,
                target_score: target,
                percent_to_target,
                business_count: mine.len(),
                small_business_count: bucket_count(BuildingTypeBucket::SmallBusiness),
                medium_business_count: bucket_count(BuildingTypeBucket::MediumBusiness),
                large_business_count: bucket_count(BuildingTypeBucket::LargeBusiness),
                average_distance,
                max_distance,
                within_fairness_tolerance: percent_to_target.abs()
                    <= options.fairness_tolerance_percent,
                contiguity_pass: true,
            }
        })
        .collect()
}

fn build_overall_metrics(rep_metrics: &[RepMetrics], included: usize) -> OverallMetrics {
    let mean: f64 =
        rep_metrics.iter().map(|m| m.weighted_score).sum::<f64>() / rep_metrics.len() as f64;
    let variance: f64 = rep_metrics
        .iter()
        .map(|m| (m.weighted_score - mean).powi(2))
        .sum::<f64>()
        / rep_metrics.len() as f64;
    let fairness_index = if mean == 0.0 { 0.0 } else { variance.sqrt() / mean };
    let max_imbalance_percent = rep_metrics
        .iter()
        .map(|m| m.percent_to_target.abs())
        .fold(0.0f64, f64::max);

    OverallMetrics {
        fairness_index,
        max_imbalance_percent,
        included_count: included,
        excluded_count: 0,
    }
}
