//! Core service contracts for the territory planner.
//!
//! Each contract has a single production implementation; tests substitute
//! fakes satisfying the same contract.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::PlannerError;
use crate::models::{
    AssignmentOptions, AssignmentResult, CandidateBuildResult, FilterOptions, RawRecord, RepRecord,
    ScoredCandidate, ScoringOptions, ZonePolygon,
};

/// Cooperative cancellation handle, checked at per-record and per-candidate
/// granularity. Cloning shares the underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Convert a raised flag into the distinct cancellation error.
    pub fn check(&self) -> Result<(), PlannerError> {
        if self.is_cancelled() {
            Err(PlannerError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Builds scored, zone-resolved candidates from a single-pass record stream.
///
/// The record producer may be lazy; implementations consume it item-by-item
/// and must not assume it can be rewound.
pub trait ScoringFilterEngine {
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
        I: IntoIterator<Item = RawRecord>;

    /// Sum of candidate scores.
    fn total_weighted_opportunity(&self, candidates: &[ScoredCandidate]) -> f64;
}

/// Partitions candidates among active reps and computes fairness metrics.
pub trait AssignmentService {
    fn assign(
        &self,
        candidates: Vec<ScoredCandidate>,
        reps: &[RepRecord],
        options: &AssignmentOptions,
        cancel: &CancelToken,
    ) -> Result<AssignmentResult, PlannerError>;
}
