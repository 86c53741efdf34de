//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services orchestrate upstream lookups and compatibility scoring.

mod analysis;
mod compatibility;

pub use analysis::{AnalysisReport, AnalysisService};
pub use compatibility::{
    CompatibilityDetails, CompatibilityResult, CompatibilityTier, compute_compatibility,
};
