//! Pricing of work items against a price catalog

use std::collections::BTreeMap;

use smeta_types::{StageCode, WorkItem};
use tracing::debug;

use super::quantity::geometry::round2;
use crate::model::{Estimate, EstimateLine, StageGroup};
use crate::repository::PriceCatalog;

/// Price every item and group the lines by stage.
///
/// Items the catalog does not know are kept with a zero price so the
/// quantity is still visible. Stages appear in execution order, lines
/// within a stage by work code. Stages without items are omitted.
pub fn price_work_items(items: &[WorkItem], catalog: &impl PriceCatalog) -> Estimate {
    let mut grouped: BTreeMap<StageCode, Vec<EstimateLine>> = BTreeMap::new();

    for item in items {
        let line = price_line(item, catalog);
        grouped.entry(item.stage_code).or_default().push(line);
    }

    let stages: Vec<StageGroup> = grouped
        .into_iter()
        .map(|(stage_code, mut lines)| {
            lines.sort_by(|a, b| a.item.work_code.cmp(&b.item.work_code));
            let stage_total = round2(lines.iter().map(|l| l.total).sum());
            StageGroup {
                stage_code,
                stage_name: stage_code.label().to_string(),
                lines,
                stage_total,
            }
        })
        .collect();

    let grand_total = round2(stages.iter().map(|s| s.stage_total).sum());
    debug!(stages = stages.len(), grand_total, "estimate priced");

    Estimate {
        stages,
        grand_total,
    }
}

fn price_line(item: &WorkItem, catalog: &impl PriceCatalog) -> EstimateLine {
    let base_price = catalog.lookup(item.stage_code, &item.work_code);
    let unit_price = base_price
        .map(|price| price * (1.0 + item.base_coef))
        .unwrap_or(0.0);

    if base_price.is_none() {
        debug!(work_code = %item.work_code, "no catalog price");
    }

    EstimateLine {
        item: item.clone(),
        base_price,
        unit_price,
        total: round2(unit_price * item.qty),
        qty_overridden: false,
        price_overridden: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smeta_types::Unit;
    use std::collections::HashMap;

    struct MapCatalog(HashMap<&'static str, f64>);

    impl PriceCatalog for MapCatalog {
        fn lookup(&self, _stage: StageCode, work_code: &str) -> Option<f64> {
            self.0.get(work_code).copied()
        }
    }

    fn catalog() -> MapCatalog {
        MapCatalog(HashMap::from([
            ("PLASTER_WALLS", 720.0),
            ("SCREED_BASE", 650.0),
            ("FIN_TOILET", 2500.0),
            ("FIN_SINK", 2000.0),
        ]))
    }

    fn work(stage: StageCode, code: &str, qty: f64, coef: f64) -> WorkItem {
        WorkItem {
            stage_code: stage,
            work_code: code.to_string(),
            name: code.to_string(),
            unit: Unit::SquareMeter,
            qty,
            base_coef: coef,
            notes: None,
        }
    }

    #[test]
    fn test_surcharge_applied_to_unit_price() {
        let items = vec![work(StageCode::Screed, "SCREED_BASE", 100.0, 0.05)];
        let estimate = price_work_items(&items, &catalog());
        let line = &estimate.stages[0].lines[0];
        assert_eq!(line.base_price, Some(650.0));
        assert!((line.unit_price - 682.5).abs() < 1e-9);
        assert_eq!(line.total, 68250.0);
        assert_eq!(estimate.grand_total, 68250.0);
    }

    #[test]
    fn test_only_total_is_rounded() {
        let catalog = MapCatalog(HashMap::from([("PAINT_WALLS", 333.33)]));
        let items = vec![work(StageCode::Paint, "PAINT_WALLS", 100.0, 0.05)];
        let estimate = price_work_items(&items, &catalog);
        let line = &estimate.stages[0].lines[0];
        assert!((line.unit_price - 349.9965).abs() < 1e-9);
        assert_eq!(line.total, 34999.65);
    }

    #[test]
    fn test_stage_order_and_line_order() {
        let items = vec![
            work(StageCode::Finish, "FIN_TOILET", 1.0, 0.0),
            work(StageCode::Finish, "FIN_SINK", 2.0, 0.0),
            work(StageCode::Plaster, "PLASTER_WALLS", 10.0, 0.0),
        ];
        let estimate = price_work_items(&items, &catalog());
        let stages: Vec<StageCode> = estimate.stages.iter().map(|s| s.stage_code).collect();
        assert_eq!(stages, vec![StageCode::Plaster, StageCode::Finish]);

        let finish = &estimate.stages[1];
        assert_eq!(finish.lines[0].item.work_code, "FIN_SINK");
        assert_eq!(finish.lines[1].item.work_code, "FIN_TOILET");
        assert_eq!(finish.stage_total, 6500.0);
        assert_eq!(finish.stage_name, StageCode::Finish.label());
        assert_eq!(estimate.grand_total, 13700.0);
    }

    #[test]
    fn test_unknown_work_code_is_zero_priced() {
        let items = vec![work(StageCode::Paint, "PAINT_WALLS", 40.0, 0.0)];
        let estimate = price_work_items(&items, &catalog());
        assert_eq!(estimate.line_count(), 1);
        assert_eq!(estimate.stages[0].lines[0].total, 0.0);
        assert_eq!(estimate.unpriced().len(), 1);
        assert!(!estimate.stages[0].lines[0].is_priced());
        assert_eq!(estimate.grand_total, 0.0);
    }

    #[test]
    fn test_empty_items() {
        let estimate = price_work_items(&[], &catalog());
        assert!(estimate.stages.is_empty());
        assert_eq!(estimate.grand_total, 0.0);
    }
}
