//! Priced estimate types

use serde::{Deserialize, Serialize};
use smeta_types::{Error, Result, StageCode, WorkItem};

use crate::service::quantity::geometry::round2;

/// A work item with its catalog price applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateLine {
    pub item: WorkItem,
    /// Catalog price before surcharge; `None` when the catalog has no entry
    pub base_price: Option<f64>,
    /// `base_price * (1 + base_coef)`, zero when unpriced
    pub unit_price: f64,
    pub total: f64,
    /// Quantity was set by hand instead of by the takeoff
    #[serde(default)]
    pub qty_overridden: bool,
    /// Unit price was set by hand instead of from the catalog
    #[serde(default)]
    pub price_overridden: bool,
}

impl EstimateLine {
    pub fn is_priced(&self) -> bool {
        self.base_price.is_some() || self.price_overridden
    }
}

/// All lines of one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageGroup {
    pub stage_code: StageCode,
    pub stage_name: String,
    pub lines: Vec<EstimateLine>,
    pub stage_total: f64,
}

/// Manual correction of one estimate line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineOverride {
    pub stage_code: StageCode,
    pub work_code: String,
    #[serde(default)]
    pub qty: Option<f64>,
    #[serde(default)]
    pub unit_price: Option<f64>,
}

impl LineOverride {
    fn validate(&self) -> Result<()> {
        for (field, value) in [("qty", self.qty), ("unit_price", self.unit_price)] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(Error::InvalidOverride(format!(
                        "{}/{}: {} must be a non-negative number, got {}",
                        self.stage_code, self.work_code, field, v
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Stage-grouped estimate with totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub stages: Vec<StageGroup>,
    pub grand_total: f64,
}

impl Estimate {
    /// Work codes the catalog could not price and nobody priced by hand
    pub fn unpriced(&self) -> Vec<&WorkItem> {
        self.stages
            .iter()
            .flat_map(|s| s.lines.iter())
            .filter(|l| !l.is_priced())
            .map(|l| &l.item)
            .collect()
    }

    pub fn line_count(&self) -> usize {
        self.stages.iter().map(|s| s.lines.len()).sum()
    }

    /// Replace the quantity and/or unit price of one line and recompute
    /// the line, stage and grand totals.
    ///
    /// Fails when the line does not exist or a value is negative or not finite.
    pub fn apply_override(&mut self, over: &LineOverride) -> Result<()> {
        over.validate()?;

        let stage = self
            .stages
            .iter_mut()
            .find(|s| s.stage_code == over.stage_code)
            .ok_or_else(|| unknown_line(over))?;
        let line = stage
            .lines
            .iter_mut()
            .find(|l| l.item.work_code == over.work_code)
            .ok_or_else(|| unknown_line(over))?;

        if let Some(qty) = over.qty {
            line.item.qty = qty;
            line.qty_overridden = true;
        }
        if let Some(unit_price) = over.unit_price {
            line.unit_price = unit_price;
            line.price_overridden = true;
        }
        line.total = round2(line.item.qty * line.unit_price);

        stage.stage_total = round2(stage.lines.iter().map(|l| l.total).sum());
        self.grand_total = round2(self.stages.iter().map(|s| s.stage_total).sum());
        Ok(())
    }

    /// Apply overrides in order, stopping at the first invalid one
    pub fn apply_overrides(&mut self, overrides: &[LineOverride]) -> Result<()> {
        overrides.iter().try_for_each(|o| self.apply_override(o))
    }
}

fn unknown_line(over: &LineOverride) -> Error {
    Error::InvalidOverride(format!(
        "no line {}/{} in the estimate",
        over.stage_code, over.work_code
    ))
}
