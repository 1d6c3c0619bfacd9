//! Planner error taxonomy.
//!
//! Validation errors are caller configuration problems raised before any
//! assignment work begins. Cancellation is a cooperative abort and is kept
//! distinct so callers can tell an aborted run from a misconfigured one.
//! Geometry robustness issues are recovered internally and never surface here.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlannerError {
    #[error("no active reps available")]
    NoActiveReps,

    #[error("no candidates available after filtering")]
    NoCandidates,

    #[error("no building types selected")]
    NoBuildingTypesSelected,

    #[error("run cancelled")]
    Cancelled,
}
