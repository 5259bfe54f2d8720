//! Cross-page reconciliation of extraction results
//!
//! Each page of a floor plan is extracted independently. Merging flattens
//! their rooms, removes duplicates seen on several pages, and reduces the
//! scalar fields with one named strategy per field:
//!
//! | field              | reducer                                   |
//! |--------------------|-------------------------------------------|
//! | `total_area_m2`    | [`max_of`] (overview page reports the total) |
//! | `ceiling_height_m` | [`first_present`] in page order           |
//! | `bathrooms_count`  | [`count_and_max`] of wet rooms vs reports |
//! | `notes`            | fixed [`MERGED_NOTES`] marker             |

use std::collections::HashMap;

use smeta_types::{BuildingAnalysis, Error, PageResult, Result, Room};
use tracing::debug;

/// Notes value of every multi-page merge result
pub const MERGED_NOTES: &str = "Merged from multiple floor-plan pages";

/// Combine per-page results into one building model.
///
/// A single page is returned untouched. Pure and deterministic.
pub fn merge(results: Vec<PageResult>) -> Result<BuildingAnalysis> {
    if results.len() <= 1 {
        return results.into_iter().next().ok_or(Error::EmptyInput);
    }

    let total_area_m2 = max_of(results.iter().map(|p| p.total_area_m2));
    let ceiling_height_m = first_present(results.iter().map(|p| p.ceiling_height_m));
    let reported_bathrooms: Vec<u32> = results.iter().map(|p| p.bathrooms_count).collect();

    let page_count = results.len();
    let rooms = deduplicate_rooms(results.into_iter().flat_map(|p| p.rooms));
    let wet_rooms = rooms.iter().filter(|r| r.is_wet_zone).count();
    let bathrooms_count = count_and_max(wet_rooms, reported_bathrooms);

    debug!(
        pages = page_count,
        rooms = rooms.len(),
        total_area_m2,
        ?ceiling_height_m,
        bathrooms_count,
        "merged page results"
    );

    Ok(BuildingAnalysis {
        total_area_m2,
        ceiling_height_m,
        rooms,
        bathrooms_count,
        notes: Some(MERGED_NOTES.to_string()),
    })
}

/// Drop rooms already seen under the same (trimmed, case-insensitive) name and exact area.
///
/// The first occurrence is kept in place; later duplicates only fill its
/// missing perimeter, height and notes.
pub fn deduplicate_rooms(rooms: impl IntoIterator<Item = Room>) -> Vec<Room> {
    let mut unique: Vec<Room> = Vec::new();
    let mut index: HashMap<(String, u64), usize> = HashMap::new();

    for room in rooms {
        let key = room_key(&room);
        match index.get(&key) {
            Some(&pos) => {
                let existing = &mut unique[pos];
                existing.perimeter_m = existing.perimeter_m.or(room.perimeter_m);
                existing.height_m = existing.height_m.or(room.height_m);
                if existing.notes.is_none() {
                    existing.notes = room.notes;
                }
            }
            None => {
                index.insert(key, unique.len());
                unique.push(room);
            }
        }
    }

    unique
}

fn room_key(room: &Room) -> (String, u64) {
    (room.name.trim().to_lowercase(), room.area_m2.to_bits())
}

/// First value present, in iteration order
pub fn first_present<T>(values: impl IntoIterator<Item = Option<T>>) -> Option<T> {
    values.into_iter().flatten().next()
}

/// Largest value; NaN entries are ignored
pub fn max_of(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().fold(f64::NEG_INFINITY, f64::max)
}

/// Reconcile a structural count against directly reported counts
pub fn count_and_max(structural: usize, reported: impl IntoIterator<Item = u32>) -> u32 {
    let reported = reported.into_iter().max().unwrap_or(0);
    let structural = u32::try_from(structural).unwrap_or(u32::MAX);
    structural.max(reported)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(total: f64, height: Option<f64>, rooms: Vec<Room>, baths: u32) -> PageResult {
        BuildingAnalysis {
            total_area_m2: total,
            ceiling_height_m: height,
            rooms,
            bathrooms_count: baths,
            notes: Some("page".to_string()),
        }
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(matches!(merge(Vec::new()), Err(Error::EmptyInput)));
    }

    #[test]
    fn test_single_page_returned_verbatim() {
        let single = page(
            55.0,
            None,
            vec![Room::new("Кухня", 12.0), Room::new("кухня", 12.0)],
            0,
        );
        let merged = merge(vec![single.clone()]).unwrap();
        assert_eq!(merged, single);
    }

    #[test]
    fn test_duplicate_kitchen_keeps_perimeter() {
        let with_perimeter = page(40.0, None, vec![Room::new("Кухня", 12.0).with_perimeter(14.0)], 0);
        let without = page(40.0, None, vec![Room::new("Кухня", 12.0)], 0);

        let merged = merge(vec![without.clone(), with_perimeter.clone()]).unwrap();
        assert_eq!(merged.rooms.len(), 1);
        assert_eq!(merged.rooms[0].perimeter_m, Some(14.0));

        let merged = merge(vec![with_perimeter, without]).unwrap();
        assert_eq!(merged.rooms.len(), 1);
        assert_eq!(merged.rooms[0].perimeter_m, Some(14.0));
    }

    #[test]
    fn test_dedup_key_ignores_case_and_whitespace() {
        let rooms = deduplicate_rooms(vec![
            Room::new("Спальня", 14.0),
            Room::new("  СПАЛЬНЯ ", 14.0).with_notes("окно на север"),
        ]);
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].name, "Спальня");
        assert_eq!(rooms[0].notes.as_deref(), Some("окно на север"));
    }

    #[test]
    fn test_dedup_requires_exact_area() {
        let rooms = deduplicate_rooms(vec![Room::new("Спальня", 14.0), Room::new("Спальня", 14.01)]);
        assert_eq!(rooms.len(), 2);
    }

    #[test]
    fn test_backfill_never_overwrites() {
        let rooms = deduplicate_rooms(vec![
            Room::new("Холл", 6.0).with_height(2.7),
            Room::new("Холл", 6.0).with_height(3.0).with_perimeter(10.0),
            Room::new("Холл", 6.0).with_perimeter(12.0),
        ]);
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].height_m, Some(2.7));
        assert_eq!(rooms[0].perimeter_m, Some(10.0));
    }

    #[test]
    fn test_first_occurrence_order_preserved() {
        let a = page(50.0, None, vec![Room::new("Спальня", 14.0), Room::new("Кухня", 10.0)], 0);
        let b = page(50.0, None, vec![Room::new("Ванная", 4.0).wet(), Room::new("Спальня", 14.0)], 1);
        let merged = merge(vec![a, b]).unwrap();
        let names: Vec<&str> = merged.rooms.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Спальня", "Кухня", "Ванная"]);
    }

    #[test]
    fn test_total_area_is_max_in_any_order() {
        let a = page(48.0, None, vec![Room::new("Спальня", 14.0)], 0);
        let b = page(72.5, None, vec![Room::new("Кухня", 10.0)], 0);
        assert_eq!(merge(vec![a.clone(), b.clone()]).unwrap().total_area_m2, 72.5);
        assert_eq!(merge(vec![b, a]).unwrap().total_area_m2, 72.5);
    }

    #[test]
    fn test_ceiling_height_depends_on_page_order() {
        let a = page(50.0, Some(2.7), vec![Room::new("Спальня", 14.0)], 0);
        let b = page(50.0, Some(3.2), vec![Room::new("Кухня", 10.0)], 0);
        let ab = merge(vec![a.clone(), b.clone()]).unwrap();
        let ba = merge(vec![b, a]).unwrap();
        assert_eq!(ab.ceiling_height_m, Some(2.7));
        assert_eq!(ba.ceiling_height_m, Some(3.2));
    }

    #[test]
    fn test_ceiling_height_skips_pages_without_value() {
        let a = page(50.0, None, vec![Room::new("Спальня", 14.0)], 0);
        let b = page(50.0, Some(3.0), vec![Room::new("Кухня", 10.0)], 0);
        assert_eq!(merge(vec![a.clone(), b]).unwrap().ceiling_height_m, Some(3.0));
        assert_eq!(merge(vec![a.clone(), a]).unwrap().ceiling_height_m, None);
    }

    #[test]
    fn test_bathrooms_reconciled_with_wet_rooms() {
        let a = page(
            90.0,
            None,
            vec![Room::new("Ванная", 4.0).wet(), Room::new("Санузел", 2.5).wet()],
            1,
        );
        let b = page(90.0, None, vec![Room::new("Спальня", 14.0)], 0);
        assert_eq!(merge(vec![a, b]).unwrap().bathrooms_count, 2);

        let c = page(90.0, None, vec![Room::new("Ванная", 4.0).wet()], 3);
        let d = page(90.0, None, vec![Room::new("Ванная", 4.0).wet()], 1);
        assert_eq!(merge(vec![c, d]).unwrap().bathrooms_count, 3);
    }

    #[test]
    fn test_merged_notes_marker() {
        let a = page(50.0, None, vec![Room::new("Спальня", 14.0)], 0);
        let merged = merge(vec![a.clone(), a]).unwrap();
        assert_eq!(merged.notes.as_deref(), Some(MERGED_NOTES));
        assert_eq!(merged.rooms.len(), 1);
    }

    #[test]
    fn test_reducers() {
        assert_eq!(first_present(vec![None, Some(1), Some(2)]), Some(1));
        assert_eq!(first_present::<u32>(vec![None, None]), None);
        assert_eq!(max_of(vec![1.0, f64::NAN, 3.0]), 3.0);
        assert_eq!(count_and_max(2, vec![1, 0]), 2);
        assert_eq!(count_and_max(0, vec![1, 4]), 4);
        assert_eq!(count_and_max(0, Vec::new()), 0);
    }
}
