//! territory-planner core
//!
//! Partitions scored business locations among field reps and synthesizes one
//! territory polygon per rep. Three stages, each a pure function of its
//! inputs: candidate building (filter/dedup/zone/score), load- and
//! distance-aware assignment, and Voronoi-based territory synthesis. File
//! ingestion and presentation are external collaborators; the crate consumes
//! typed records and polygons.

pub mod address;
pub mod assignment;
pub mod builder;
pub mod error;
pub mod export;
pub mod geoutil;
pub mod models;
pub mod territory;
pub mod traits;
pub mod zones;
