//! Quantity takeoff engine
//!
//! Derives the staged bill of work quantities from a building model. The
//! engine is pure: the same context and config always yield the same
//! items in the same order (plaster, rough electric, rough plumbing,
//! screed, drywall ceiling, floor tile, wall tile, paint preparation,
//! flooring, paint, finish).

pub mod geometry;
pub mod stages;

use smeta_types::{Result, WorkItem};
use tracing::debug;

use crate::config::QuantityConfig;
use crate::model::CalculationContext;
use stages::STAGES;

#[derive(Debug, Clone)]
pub struct QuantityEngine {
    config: QuantityConfig,
}

impl QuantityEngine {
    /// Create an engine, rejecting out-of-range coefficients
    pub fn new(config: QuantityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &QuantityConfig {
        &self.config
    }

    /// Run every stage calculator in order
    pub fn calculate(&self, ctx: &CalculationContext) -> Vec<WorkItem> {
        let mut items = Vec::new();
        for (name, calculator) in STAGES {
            let produced = calculator(ctx, &self.config);
            debug!(stage = name, items = produced.len(), "stage calculated");
            items.extend(produced);
        }
        items
    }
}

impl Default for QuantityEngine {
    fn default() -> Self {
        Self {
            config: QuantityConfig::default(),
        }
    }
}
