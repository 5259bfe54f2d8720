//! Structural validation of a building model

use smeta_types::{BuildingAnalysis, Error, Result};

/// Reject shapes a vision model may emit that the takeoff cannot use.
pub fn validate_analysis(analysis: &BuildingAnalysis) -> Result<()> {
    if !is_positive(analysis.total_area_m2) {
        return Err(Error::SchemaValidation(format!(
            "total_area_m2 must be positive, got {}",
            analysis.total_area_m2
        )));
    }

    if let Some(h) = analysis.ceiling_height_m {
        if !is_positive(h) {
            return Err(Error::SchemaValidation(format!(
                "ceiling_height_m must be positive, got {}",
                h
            )));
        }
    }

    if analysis.rooms.is_empty() {
        return Err(Error::SchemaValidation("rooms must not be empty".to_string()));
    }

    for (i, room) in analysis.rooms.iter().enumerate() {
        if !is_positive(room.area_m2) {
            return Err(Error::SchemaValidation(format!(
                "rooms[{}] ({}): area_m2 must be positive, got {}",
                i, room.name, room.area_m2
            )));
        }
        if let Some(p) = room.perimeter_m {
            if !is_positive(p) {
                return Err(Error::SchemaValidation(format!(
                    "rooms[{}] ({}): perimeter_m must be positive, got {}",
                    i, room.name, p
                )));
            }
        }
        if let Some(h) = room.height_m {
            if !is_positive(h) {
                return Err(Error::SchemaValidation(format!(
                    "rooms[{}] ({}): height_m must be positive, got {}",
                    i, room.name, h
                )));
            }
        }
    }

    Ok(())
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
