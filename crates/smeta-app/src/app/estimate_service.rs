//! Estimate Service - building model to priced, stage-grouped estimate

use serde::{Deserialize, Serialize};
use smeta_domain::{
    count_living_rooms, price_work_items, validate_analysis, CalculationContext, Estimate,
    EstimatorOptions, PriceCatalog, QuantityEngine,
};
use smeta_types::{BuildingAnalysis, Hints, Result, WorkItem};
use tracing::info;

/// Work quantities and their priced grouping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateReport {
    pub context: CalculationContext,
    /// Engine output in emission order
    pub work_items: Vec<WorkItem>,
    pub estimate: Estimate,
}

/// Derive quantities for an analysis and price them
pub fn build_estimate(
    analysis: &BuildingAnalysis,
    hints: &Hints,
    options: &EstimatorOptions,
    catalog: &impl PriceCatalog,
) -> Result<EstimateReport> {
    validate_analysis(analysis)?;
    let engine = QuantityEngine::new(options.quantity.clone())?;

    let context = CalculationContext::from_analysis(analysis, hints);
    let work_items = engine.calculate(&context);
    let estimate = price_work_items(&work_items, catalog);

    info!(
        items = work_items.len(),
        unpriced = estimate.unpriced().len(),
        grand_total = estimate.grand_total,
        "estimate built"
    );

    Ok(EstimateReport {
        context,
        work_items,
        estimate,
    })
}

/// Hints read off the analysis itself, for estimates without declared hints.
///
/// A kitchen-living room is assumed when a room name mentions both a
/// kitchen and a living room ("Кухня-гостиная").
pub fn hints_from_analysis(analysis: &BuildingAnalysis) -> Hints {
    let has_kitchen_living = analysis
        .rooms
        .iter()
        .any(|r| r.name_contains("кухня") && r.name_contains("гостиная"));

    Hints {
        floor_area_m2: analysis.total_area_m2,
        living_rooms_count: count_living_rooms(&analysis.rooms),
        has_kitchen_living,
        bathrooms_count: analysis.bathrooms_count,
        ceiling_height_m: analysis.ceiling_height_m,
    }
}
