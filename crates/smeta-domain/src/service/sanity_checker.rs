//! Cross-check of an extracted building model against user hints

use smeta_types::{BuildingAnalysis, Hints, Result, Room};
use tracing::warn;

use crate::config::SanityThresholds;

/// Room names containing any of these are not counted as living rooms.
///
/// Plain substring match on Russian names; naming variants such as
/// "кухня-гостиная" are excluded as kitchens, "прихожая" is not.
pub const NON_LIVING_KEYWORDS: [&str; 3] = ["кухня", "коридор", "холл"];

/// Compares an analysis with the declared hints and reports deviations
#[derive(Debug, Clone)]
pub struct SanityChecker {
    thresholds: SanityThresholds,
}

impl SanityChecker {
    pub fn new(thresholds: SanityThresholds) -> Result<Self> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &SanityThresholds {
        &self.thresholds
    }

    /// Human-readable warnings in the order area, rooms, bathrooms.
    ///
    /// Without hints there is nothing to compare and the result is empty.
    pub fn check(&self, analysis: &BuildingAnalysis, hints: Option<&Hints>) -> Vec<String> {
        let Some(hints) = hints else {
            return Vec::new();
        };

        let warnings: Vec<String> = [
            self.check_area(analysis, hints),
            self.check_rooms(analysis, hints),
            self.check_bathrooms(analysis, hints),
        ]
        .into_iter()
        .flatten()
        .collect();

        for warning in &warnings {
            warn!("{}", warning);
        }
        warnings
    }

    fn check_area(&self, analysis: &BuildingAnalysis, hints: &Hints) -> Option<String> {
        let deviation = (analysis.total_area_m2 - hints.floor_area_m2).abs() / hints.floor_area_m2;
        if deviation > self.thresholds.area_deviation_threshold {
            Some(format!(
                "Area deviation above {:.0}%: extracted {} m², declared {} m² ({:.1}%)",
                self.thresholds.area_deviation_threshold * 100.0,
                analysis.total_area_m2,
                hints.floor_area_m2,
                deviation * 100.0
            ))
        } else {
            None
        }
    }

    fn check_rooms(&self, analysis: &BuildingAnalysis, hints: &Hints) -> Option<String> {
        let living = count_living_rooms(&analysis.rooms);
        if living.abs_diff(hints.living_rooms_count) > self.thresholds.rooms_deviation_abs {
            Some(format!(
                "Living room count mismatch: extracted {}, declared {}",
                living, hints.living_rooms_count
            ))
        } else {
            None
        }
    }

    fn check_bathrooms(&self, analysis: &BuildingAnalysis, hints: &Hints) -> Option<String> {
        if analysis.bathrooms_count.abs_diff(hints.bathrooms_count)
            > self.thresholds.bathrooms_deviation_abs
        {
            Some(format!(
                "Bathroom count mismatch: extracted {}, declared {}",
                analysis.bathrooms_count, hints.bathrooms_count
            ))
        } else {
            None
        }
    }
}

impl Default for SanityChecker {
    fn default() -> Self {
        Self {
            thresholds: SanityThresholds::default(),
        }
    }
}

/// Rooms that are neither wet zones nor kitchens, corridors or halls
pub fn count_living_rooms(rooms: &[Room]) -> u32 {
    let count = rooms
        .iter()
        .filter(|r| !r.is_wet_zone)
        .filter(|r| !NON_LIVING_KEYWORDS.iter().any(|kw| r.name_contains(kw)))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}
