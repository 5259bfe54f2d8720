//! Domain model types

pub mod context;
pub mod estimate;

pub use context::CalculationContext;
pub use estimate::{Estimate, EstimateLine, LineOverride, StageGroup};
