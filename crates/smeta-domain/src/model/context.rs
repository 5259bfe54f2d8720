//! Input of the quantity takeoff

use serde::{Deserialize, Serialize};
use smeta_types::{BuildingAnalysis, Hints, Room};

/// Everything the stage calculators read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationContext {
    pub area_total: f64,
    /// `None` (or a non-positive value) means "use the configured default"
    pub ceiling_height_m: Option<f64>,
    pub rooms: Vec<Room>,
    pub bathrooms_count: u32,
    pub has_kitchen_living: bool,
    pub hints: Hints,
}

impl CalculationContext {
    /// Build a context from an analysis (fresh or previously saved) and the project hints.
    ///
    /// Ceiling height falls back from the analysis to the hints. A bathroom
    /// count of zero in the analysis falls back to the declared count.
    pub fn from_analysis(analysis: &BuildingAnalysis, hints: &Hints) -> Self {
        let ceiling_height_m = analysis
            .ceiling_height_m
            .filter(|h| *h > 0.0)
            .or(hints.ceiling_height_m.filter(|h| *h > 0.0));

        let bathrooms_count = if analysis.bathrooms_count > 0 {
            analysis.bathrooms_count
        } else {
            hints.bathrooms_count
        };

        Self {
            area_total: analysis.total_area_m2,
            ceiling_height_m,
            rooms: analysis.rooms.clone(),
            bathrooms_count,
            has_kitchen_living: hints.has_kitchen_living,
            hints: hints.clone(),
        }
    }

    /// Effective ceiling height
    pub fn height_or(&self, default_m: f64) -> f64 {
        self.ceiling_height_m
            .filter(|h| *h > 0.0)
            .unwrap_or(default_m)
    }

    pub fn dry_rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter().filter(|r| !r.is_wet_zone)
    }

    pub fn wet_rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter().filter(|r| r.is_wet_zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hints() -> Hints {
        Hints {
            floor_area_m2: 70.0,
            living_rooms_count: 2,
            has_kitchen_living: true,
            bathrooms_count: 2,
            ceiling_height_m: Some(2.8),
        }
    }

    fn analysis() -> BuildingAnalysis {
        BuildingAnalysis {
            total_area_m2: 68.0,
            ceiling_height_m: None,
            rooms: vec![Room::new("Спальня", 15.0), Room::new("Ванная", 4.0).wet()],
            bathrooms_count: 1,
            notes: None,
        }
    }

    #[test]
    fn test_from_analysis_takes_hint_height_when_missing() {
        let ctx = CalculationContext::from_analysis(&analysis(), &hints());
        assert_eq!(ctx.ceiling_height_m, Some(2.8));
        assert_eq!(ctx.area_total, 68.0);
        assert_eq!(ctx.bathrooms_count, 1);
        assert!(ctx.has_kitchen_living);
    }

    #[test]
    fn test_from_analysis_prefers_analysis_height() {
        let mut a = analysis();
        a.ceiling_height_m = Some(3.1);
        let ctx = CalculationContext::from_analysis(&a, &hints());
        assert_eq!(ctx.ceiling_height_m, Some(3.1));
    }

    #[test]
    fn test_zero_bathrooms_falls_back_to_hints() {
        let mut a = analysis();
        a.bathrooms_count = 0;
        let ctx = CalculationContext::from_analysis(&a, &hints());
        assert_eq!(ctx.bathrooms_count, 2);
    }

    #[test]
    fn test_height_or_default() {
        let mut ctx = CalculationContext::from_analysis(&analysis(), &hints());
        ctx.ceiling_height_m = None;
        assert_eq!(ctx.height_or(2.7), 2.7);
        ctx.ceiling_height_m = Some(0.0);
        assert_eq!(ctx.height_or(2.7), 2.7);
    }

    #[test]
    fn test_room_partitions() {
        let ctx = CalculationContext::from_analysis(&analysis(), &hints());
        assert_eq!(ctx.dry_rooms().count(), 1);
        assert_eq!(ctx.wet_rooms().count(), 1);
    }
}
