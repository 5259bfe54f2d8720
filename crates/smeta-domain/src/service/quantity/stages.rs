//! Stage calculators
//!
//! Each calculator reads the context and config only and returns fresh
//! work items. Quantities are rounded to two decimals; surcharges go to
//! `base_coef`.

use smeta_types::{StageCode, Unit, WorkItem};

use super::geometry::{room_perimeter, round2, wall_area};
use crate::config::QuantityConfig;
use crate::model::CalculationContext;

pub type StageCalculator = fn(&CalculationContext, &QuantityConfig) -> Vec<WorkItem>;

/// Calculators in emission order
pub const STAGES: [(&str, StageCalculator); 11] = [
    ("plaster", plaster),
    ("electric_rough", electric_rough),
    ("plumbing_rough", plumbing_rough),
    ("screed", screed),
    ("drywall_ceiling", drywall_ceiling),
    ("tile_floor", tile_floor),
    ("tile_walls", tile_walls),
    ("paint_prep", paint_prep),
    ("flooring", flooring),
    ("paint", paint),
    ("finish", finish),
];

/// Room names that mark the kitchen/living area for tile
const KITCHEN_KEYWORDS: [&str; 2] = ["кухня", "гостиная"];

fn item(
    stage_code: StageCode,
    work_code: &str,
    name: &str,
    unit: Unit,
    qty: f64,
    base_coef: f64,
    notes: Option<String>,
) -> WorkItem {
    WorkItem {
        stage_code,
        work_code: work_code.to_string(),
        name: name.to_string(),
        unit,
        qty: round2(qty),
        base_coef,
        notes,
    }
}

fn percent_note(label: &str, coef: f64) -> String {
    format!("{} +{:.0}%", label, coef * 100.0)
}

fn dry_area(ctx: &CalculationContext) -> f64 {
    ctx.dry_rooms().map(|r| r.area_m2).sum()
}

/// Dry-room walls less openings; shared by putty and wall paint
fn dry_paintable_walls(ctx: &CalculationContext, cfg: &QuantityConfig) -> f64 {
    let h = ctx.height_or(cfg.default_ceiling_height_m);
    wall_area(ctx.dry_rooms(), h, cfg.wall_area_approx_ratio) * cfg.opening_deduction_factor
}

fn tile_coef(ctx: &CalculationContext, cfg: &QuantityConfig) -> f64 {
    if ctx.area_total > cfg.tile_complex_threshold_m2 {
        cfg.tile_complex_surcharge
    } else {
        0.0
    }
}

pub fn plaster(ctx: &CalculationContext, cfg: &QuantityConfig) -> Vec<WorkItem> {
    let h = ctx.height_or(cfg.default_ceiling_height_m);
    let walls = wall_area(&ctx.rooms, h, cfg.wall_area_approx_ratio) * cfg.opening_deduction_factor;

    let high = h > cfg.plaster_high_ceiling_threshold_m;
    let coef = if high { cfg.plaster_high_ceiling_surcharge } else { 0.0 };

    vec![item(
        StageCode::Plaster,
        "PLASTER_WALLS",
        "Штукатурка стен по маякам",
        Unit::SquareMeter,
        walls,
        coef,
        high.then(|| percent_note("Высокие потолки", coef)),
    )]
}

pub fn electric_rough(ctx: &CalculationContext, _cfg: &QuantityConfig) -> Vec<WorkItem> {
    let mut points = 6 * ctx.dry_rooms().count() as u64;
    points += 4 * u64::from(ctx.bathrooms_count);
    if ctx.has_kitchen_living {
        points += 8;
    }

    vec![item(
        StageCode::ElecRough,
        "ELEC_POINT",
        "Электроточка (розетка/выключатель)",
        Unit::Point,
        points as f64,
        0.0,
        Some("Расчёт по скоринговой модели".to_string()),
    )]
}

pub fn plumbing_rough(ctx: &CalculationContext, cfg: &QuantityConfig) -> Vec<WorkItem> {
    let kitchen_points = if ctx.has_kitchen_living { 2 } else { 1 };
    let points = 3 * u64::from(ctx.bathrooms_count) + kitchen_points;

    let multi = ctx.bathrooms_count >= cfg.plumbing_multi_bath_min;
    let coef = if multi { cfg.plumbing_multi_bath_surcharge } else { 0.0 };

    vec![item(
        StageCode::PlumbRough,
        "PLUMB_POINT",
        "Сантехническая точка",
        Unit::Point,
        points as f64,
        coef,
        multi.then(|| percent_note("Несколько санузлов", coef)),
    )]
}

pub fn screed(ctx: &CalculationContext, cfg: &QuantityConfig) -> Vec<WorkItem> {
    let (coef, notes) = if ctx.area_total > cfg.screed_large_150_threshold_m2 {
        let coef = cfg.screed_large_150_surcharge;
        let label = format!("Площадь >{}м²", cfg.screed_large_150_threshold_m2);
        (coef, Some(percent_note(&label, coef)))
    } else if ctx.area_total > cfg.screed_large_90_threshold_m2 {
        let coef = cfg.screed_large_90_surcharge;
        let label = format!("Площадь >{}м²", cfg.screed_large_90_threshold_m2);
        (coef, Some(percent_note(&label, coef)))
    } else {
        (0.0, None)
    };

    vec![item(
        StageCode::Screed,
        "SCREED_BASE",
        "Стяжка пола 40мм",
        Unit::SquareMeter,
        ctx.area_total,
        coef,
        notes,
    )]
}

pub fn drywall_ceiling(ctx: &CalculationContext, _cfg: &QuantityConfig) -> Vec<WorkItem> {
    vec![item(
        StageCode::Gkl,
        "GKL_CEILING",
        "Потолок из ГКЛ в 1 слой",
        Unit::SquareMeter,
        dry_area(ctx),
        0.0,
        Some("Сухие помещения".to_string()),
    )]
}

pub fn tile_floor(ctx: &CalculationContext, cfg: &QuantityConfig) -> Vec<WorkItem> {
    let mut floor: f64 = ctx.wet_rooms().map(|r| r.area_m2).sum();

    if ctx.has_kitchen_living {
        let kitchen = ctx
            .rooms
            .iter()
            .find(|r| KITCHEN_KEYWORDS.iter().any(|kw| r.name_contains(kw)));
        if let Some(kitchen) = kitchen {
            floor += kitchen.area_m2 * cfg.kitchen_tile_share;
        }
    }

    let coef = tile_coef(ctx, cfg);
    vec![item(
        StageCode::Tile,
        "TILE_FLOOR",
        "Укладка плитки на пол",
        Unit::SquareMeter,
        floor,
        coef,
        (coef > 0.0).then(|| percent_note("Сложная раскладка", coef)),
    )]
}

pub fn tile_walls(ctx: &CalculationContext, cfg: &QuantityConfig) -> Vec<WorkItem> {
    let h = ctx.height_or(cfg.default_ceiling_height_m);
    let walls = wall_area(ctx.wet_rooms(), h, cfg.wall_area_approx_ratio) * cfg.tile_wall_height_fraction;

    vec![item(
        StageCode::Tile,
        "TILE_WALLS",
        "Укладка плитки на стены",
        Unit::SquareMeter,
        walls,
        tile_coef(ctx, cfg),
        Some("Мокрые зоны".to_string()),
    )]
}

pub fn paint_prep(ctx: &CalculationContext, cfg: &QuantityConfig) -> Vec<WorkItem> {
    vec![item(
        StageCode::PaintPrep,
        "PUTTY",
        "Шпаклевка стен под окраску",
        Unit::SquareMeter,
        dry_paintable_walls(ctx, cfg),
        0.0,
        None,
    )]
}

pub fn flooring(ctx: &CalculationContext, _cfg: &QuantityConfig) -> Vec<WorkItem> {
    vec![item(
        StageCode::Floor,
        "FLOOR_LAMINATE",
        "Укладка ламината",
        Unit::SquareMeter,
        dry_area(ctx),
        0.0,
        Some("Сухие помещения".to_string()),
    )]
}

pub fn paint(ctx: &CalculationContext, cfg: &QuantityConfig) -> Vec<WorkItem> {
    vec![
        item(
            StageCode::Paint,
            "PAINT_WALLS",
            "Окраска стен",
            Unit::SquareMeter,
            dry_paintable_walls(ctx, cfg),
            0.0,
            None,
        ),
        item(
            StageCode::Paint,
            "PAINT_CEILING",
            "Окраска потолков",
            Unit::SquareMeter,
            dry_area(ctx),
            0.0,
            None,
        ),
    ]
}

pub fn finish(ctx: &CalculationContext, _cfg: &QuantityConfig) -> Vec<WorkItem> {
    let baths = f64::from(ctx.bathrooms_count);
    let kitchen_sink = if ctx.has_kitchen_living { 1.0 } else { 0.0 };
    let baseboard: f64 = ctx.dry_rooms().map(room_perimeter).sum();

    vec![
        item(
            StageCode::Finish,
            "FIN_TOILET",
            "Установка унитаза",
            Unit::Piece,
            baths,
            0.0,
            None,
        ),
        item(
            StageCode::Finish,
            "FIN_SINK",
            "Установка раковины",
            Unit::Piece,
            baths + kitchen_sink,
            0.0,
            None,
        ),
        item(
            StageCode::Finish,
            "FIN_BASEBOARD",
            "Установка плинтуса",
            Unit::LinearMeter,
            baseboard,
            0.0,
            None,
        ),
    ]
}
