//! Geometric approximations shared by several stages

use smeta_types::Room;

/// Round to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Wall area of one room before opening deduction.
///
/// `perimeter * height` when the perimeter is known, otherwise
/// `area * approx_ratio`.
pub fn room_wall_area(room: &Room, height_m: f64, approx_ratio: f64) -> f64 {
    match known_perimeter(room) {
        Some(perimeter) => perimeter * height_m,
        None => room.area_m2 * approx_ratio,
    }
}

/// Sum of [`room_wall_area`] over rooms
pub fn wall_area<'a>(
    rooms: impl IntoIterator<Item = &'a Room>,
    height_m: f64,
    approx_ratio: f64,
) -> f64 {
    rooms
        .into_iter()
        .map(|room| room_wall_area(room, height_m, approx_ratio))
        .sum()
}

/// Perimeter, or that of a square with the same floor area
pub fn room_perimeter(room: &Room) -> f64 {
    known_perimeter(room).unwrap_or_else(|| room.area_m2.sqrt() * 4.0)
}

fn known_perimeter(room: &Room) -> Option<f64> {
    room.perimeter_m.filter(|p| *p > 0.0)
}
