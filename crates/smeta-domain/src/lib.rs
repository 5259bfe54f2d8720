//! Domain layer for renovation estimating
//!
//! Page reconciliation, sanity checks, quantity takeoff and pricing.
//! Nothing here performs I/O.

pub mod config;
pub mod model;
pub mod repository;
pub mod service;

pub use config::{AnalysisConfig, EstimatorOptions, QuantityConfig, SanityThresholds};
pub use model::{CalculationContext, Estimate, EstimateLine, LineOverride, StageGroup};
pub use repository::PriceCatalog;
pub use service::{
    count_living_rooms, merge, price_work_items, validate_analysis, QuantityEngine, SanityChecker,
};
