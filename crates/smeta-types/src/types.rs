//! Core types for floor-plan analysis and quantity takeoff

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// One room as read from a floor plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    pub area_m2: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perimeter_m: Option<f64>,
    /// Bathroom, WC, utility room
    #[serde(default)]
    pub is_wet_zone: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Room {
    pub fn new(name: impl Into<String>, area_m2: f64) -> Self {
        Self {
            name: name.into(),
            area_m2,
            perimeter_m: None,
            is_wet_zone: false,
            height_m: None,
            notes: None,
        }
    }

    pub fn with_perimeter(mut self, perimeter_m: f64) -> Self {
        self.perimeter_m = Some(perimeter_m);
        self
    }

    pub fn wet(mut self) -> Self {
        self.is_wet_zone = true;
        self
    }

    pub fn with_height(mut self, height_m: f64) -> Self {
        self.height_m = Some(height_m);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Case-insensitive substring match on the room name
    pub fn name_contains(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
    }
}

/// Reconciled room/area/height dataset for a whole building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingAnalysis {
    pub total_area_m2: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ceiling_height_m: Option<f64>,
    pub rooms: Vec<Room>,
    /// Pages that do not report bathrooms count as zero
    #[serde(default)]
    pub bathrooms_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BuildingAnalysis {
    pub fn wet_rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter().filter(|r| r.is_wet_zone)
    }
}

/// Raw extraction of a single page; same shape as the merged model
pub type PageResult = BuildingAnalysis;

/// User-declared expectations, used to validate extraction results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hints {
    pub floor_area_m2: f64,
    pub living_rooms_count: u32,
    pub has_kitchen_living: bool,
    pub bathrooms_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ceiling_height_m: Option<f64>,
}

impl Hints {
    pub const MAX_FLOOR_AREA_M2: f64 = 1000.0;
    pub const MAX_LIVING_ROOMS: u32 = 20;
    pub const MAX_BATHROOMS: u32 = 10;
    pub const MAX_CEILING_HEIGHT_M: f64 = 5.0;

    /// Check the pre-upload form bounds
    pub fn validate(&self) -> Result<()> {
        if !(self.floor_area_m2 > 0.0 && self.floor_area_m2 <= Self::MAX_FLOOR_AREA_M2) {
            return Err(Error::InvalidHints(format!(
                "floor_area_m2 must be in (0, {}], got {}",
                Self::MAX_FLOOR_AREA_M2,
                self.floor_area_m2
            )));
        }
        if self.living_rooms_count > Self::MAX_LIVING_ROOMS {
            return Err(Error::InvalidHints(format!(
                "living_rooms_count must be at most {}, got {}",
                Self::MAX_LIVING_ROOMS,
                self.living_rooms_count
            )));
        }
        if self.bathrooms_count > Self::MAX_BATHROOMS {
            return Err(Error::InvalidHints(format!(
                "bathrooms_count must be at most {}, got {}",
                Self::MAX_BATHROOMS,
                self.bathrooms_count
            )));
        }
        if let Some(h) = self.ceiling_height_m {
            if !(h > 0.0 && h <= Self::MAX_CEILING_HEIGHT_M) {
                return Err(Error::InvalidHints(format!(
                    "ceiling_height_m must be in (0, {}], got {}",
                    Self::MAX_CEILING_HEIGHT_M,
                    h
                )));
            }
        }
        Ok(())
    }
}

/// Renovation stage, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageCode {
    Masonry,
    Plaster,
    ElecRough,
    PlumbRough,
    Screed,
    Gkl,
    Tile,
    PaintPrep,
    Floor,
    Paint,
    Finish,
}

impl StageCode {
    pub const ALL: [StageCode; 11] = [
        StageCode::Masonry,
        StageCode::Plaster,
        StageCode::ElecRough,
        StageCode::PlumbRough,
        StageCode::Screed,
        StageCode::Gkl,
        StageCode::Tile,
        StageCode::PaintPrep,
        StageCode::Floor,
        StageCode::Paint,
        StageCode::Finish,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            StageCode::Masonry => "MASONRY",
            StageCode::Plaster => "PLASTER",
            StageCode::ElecRough => "ELEC_ROUGH",
            StageCode::PlumbRough => "PLUMB_ROUGH",
            StageCode::Screed => "SCREED",
            StageCode::Gkl => "GKL",
            StageCode::Tile => "TILE",
            StageCode::PaintPrep => "PAINT_PREP",
            StageCode::Floor => "FLOOR",
            StageCode::Paint => "PAINT",
            StageCode::Finish => "FINISH",
        }
    }

    /// Display name in Russian
    pub fn label(&self) -> &'static str {
        match self {
            StageCode::Masonry => "Кладка стен",
            StageCode::Plaster => "Штукатурка стен",
            StageCode::ElecRough => "Черновая электрика",
            StageCode::PlumbRough => "Черновая сантехника",
            StageCode::Screed => "Стяжка",
            StageCode::Gkl => "ГКЛ (перегородки/потолки/короба)",
            StageCode::Tile => "Плитка (пол/стены)",
            StageCode::PaintPrep => "Подготовка стен под окраску",
            StageCode::Floor => "Напольное покрытие",
            StageCode::Paint => "Окраска стен/потолков",
            StageCode::Finish => "Финишные работы",
        }
    }
}

impl fmt::Display for StageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for StageCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        StageCode::ALL
            .iter()
            .copied()
            .find(|stage| stage.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::Catalog(format!("Unknown stage code: {}", s)))
    }
}

/// Unit of measure for a work item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "m2")]
    SquareMeter,
    #[serde(rename = "lm")]
    LinearMeter,
    #[serde(rename = "pcs")]
    Piece,
    #[serde(rename = "point")]
    Point,
}

impl Unit {
    pub fn label(&self) -> &'static str {
        match self {
            Unit::SquareMeter => "м²",
            Unit::LinearMeter => "м.п.",
            Unit::Piece => "шт",
            Unit::Point => "точка",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "m2" | "м²" | "м2" => Ok(Unit::SquareMeter),
            "lm" | "м.п." | "мп" => Ok(Unit::LinearMeter),
            "pcs" | "шт" => Ok(Unit::Piece),
            "point" | "точка" => Ok(Unit::Point),
            other => Err(Error::Catalog(format!("Unknown unit: {}", other))),
        }
    }
}

/// One derived work quantity
///
/// Surcharges live in `base_coef` and are never folded into `qty`;
/// pricing applies `unit_price * (1 + base_coef)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub stage_code: StageCode,
    pub work_code: String,
    pub name: String,
    pub unit: Unit,
    pub qty: f64,
    pub base_coef: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
