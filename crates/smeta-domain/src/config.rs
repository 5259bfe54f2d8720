//! Tunable constants for takeoff rules, sanity checks and page analysis
//!
//! Every struct deserializes with per-field defaults, so a config file only
//! needs the values it overrides. Constructors of the services that consume
//! these structs call `validate()` and refuse out-of-range values.

use serde::{Deserialize, Serialize};
use smeta_types::{Error, Result};

/// Coefficients and thresholds of the quantity takeoff rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantityConfig {
    /// Surcharge for plastering when ceilings exceed the threshold
    pub plaster_high_ceiling_surcharge: f64,
    pub plaster_high_ceiling_threshold_m: f64,
    /// Screed surcharge for area_total > 90
    pub screed_large_90_surcharge: f64,
    /// Screed surcharge for area_total > 150
    pub screed_large_150_surcharge: f64,
    pub screed_large_90_threshold_m2: f64,
    pub screed_large_150_threshold_m2: f64,
    pub plumbing_multi_bath_surcharge: f64,
    /// Bathroom count from which the plumbing surcharge applies
    pub plumbing_multi_bath_min: u32,
    pub tile_complex_surcharge: f64,
    pub tile_complex_threshold_m2: f64,
    /// Share of the ceiling height covered by wall tile in wet zones
    pub tile_wall_height_fraction: f64,
    /// Share of the kitchen/living room floor laid with tile
    pub kitchen_tile_share: f64,
    /// Wall area per m² of floor when a room has no perimeter
    pub wall_area_approx_ratio: f64,
    /// Share of wall area left after door/window openings
    pub opening_deduction_factor: f64,
    pub default_ceiling_height_m: f64,
}

impl Default for QuantityConfig {
    fn default() -> Self {
        Self {
            plaster_high_ceiling_surcharge: 0.10,
            plaster_high_ceiling_threshold_m: 3.0,
            screed_large_90_surcharge: 0.05,
            screed_large_150_surcharge: 0.10,
            screed_large_90_threshold_m2: 90.0,
            screed_large_150_threshold_m2: 150.0,
            plumbing_multi_bath_surcharge: 0.10,
            plumbing_multi_bath_min: 2,
            tile_complex_surcharge: 0.05,
            tile_complex_threshold_m2: 120.0,
            tile_wall_height_fraction: 0.8,
            kitchen_tile_share: 0.3,
            wall_area_approx_ratio: 2.6,
            opening_deduction_factor: 0.85,
            default_ceiling_height_m: 2.7,
        }
    }
}

impl QuantityConfig {
    pub fn validate(&self) -> Result<()> {
        check_fraction("plaster_high_ceiling_surcharge", self.plaster_high_ceiling_surcharge)?;
        check_fraction("screed_large_90_surcharge", self.screed_large_90_surcharge)?;
        check_fraction("screed_large_150_surcharge", self.screed_large_150_surcharge)?;
        check_fraction("plumbing_multi_bath_surcharge", self.plumbing_multi_bath_surcharge)?;
        check_fraction("tile_complex_surcharge", self.tile_complex_surcharge)?;
        check_fraction("tile_wall_height_fraction", self.tile_wall_height_fraction)?;
        check_fraction("kitchen_tile_share", self.kitchen_tile_share)?;
        check_fraction("opening_deduction_factor", self.opening_deduction_factor)?;
        check_positive("plaster_high_ceiling_threshold_m", self.plaster_high_ceiling_threshold_m)?;
        check_non_negative("screed_large_90_threshold_m2", self.screed_large_90_threshold_m2)?;
        check_non_negative("screed_large_150_threshold_m2", self.screed_large_150_threshold_m2)?;
        check_non_negative("tile_complex_threshold_m2", self.tile_complex_threshold_m2)?;
        check_positive("wall_area_approx_ratio", self.wall_area_approx_ratio)?;
        check_positive("default_ceiling_height_m", self.default_ceiling_height_m)?;

        if self.screed_large_150_threshold_m2 < self.screed_large_90_threshold_m2 {
            return Err(Error::ThresholdConfig {
                name: "screed_large_150_threshold_m2",
                value: self.screed_large_150_threshold_m2,
                reason: "must not be below screed_large_90_threshold_m2",
            });
        }
        Ok(())
    }
}

/// Allowed deviations between extracted data and user hints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanityThresholds {
    /// Relative area deviation; a warning needs a strictly larger value
    pub area_deviation_threshold: f64,
    pub rooms_deviation_abs: u32,
    pub bathrooms_deviation_abs: u32,
}

impl Default for SanityThresholds {
    fn default() -> Self {
        Self {
            area_deviation_threshold: 0.10,
            rooms_deviation_abs: 1,
            bathrooms_deviation_abs: 1,
        }
    }
}

impl SanityThresholds {
    pub fn new(
        area_deviation_threshold: f64,
        rooms_deviation_abs: u32,
        bathrooms_deviation_abs: u32,
    ) -> Result<Self> {
        let thresholds = Self {
            area_deviation_threshold,
            rooms_deviation_abs,
            bathrooms_deviation_abs,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<()> {
        check_fraction("area_deviation_threshold", self.area_deviation_threshold)
    }
}

/// Limits of a single analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Pages beyond this count are ignored
    pub max_pages_per_analysis: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_pages_per_analysis: 5,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_pages_per_analysis == 0 {
            return Err(Error::ThresholdConfig {
                name: "max_pages_per_analysis",
                value: 0.0,
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

/// Complete option set consumed by the estimator core
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorOptions {
    pub quantity: QuantityConfig,
    pub sanity: SanityThresholds,
    pub analysis: AnalysisConfig,
}

impl EstimatorOptions {
    pub fn validate(&self) -> Result<()> {
        self.quantity.validate()?;
        self.sanity.validate()?;
        self.analysis.validate()
    }
}

fn check_fraction(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(Error::ThresholdConfig {
            name,
            value,
            reason: "must be a fraction in [0, 1]",
        });
    }
    Ok(())
}

fn check_positive(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::ThresholdConfig {
            name,
            value,
            reason: "must be positive",
        });
    }
    Ok(())
}

fn check_non_negative(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::ThresholdConfig {
            name,
            value,
            reason: "must not be negative",
        });
    }
    Ok(())
}
