//! Use cases

pub mod analysis_service;
pub mod estimate_service;

pub use analysis_service::{AnalysisOrchestrator, AnalysisOutcome, AnalysisReport};
pub use estimate_service::{build_estimate, hints_from_analysis, EstimateReport};
