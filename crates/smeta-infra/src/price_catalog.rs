//! Price catalog loaded from TOML, CSV or the built-in reference prices

use serde::Deserialize;
use smeta_domain::PriceCatalog;
use smeta_types::{Error, Result, StageCode, Unit};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::catalog_csv::load_catalog_csv;

/// One priced work type
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    pub stage_code: StageCode,
    pub work_code: String,
    pub name: String,
    pub unit: Unit,
    pub base_price: f64,
    pub is_active: bool,
}

/// Catalog row as written in files; codes and units are parsed afterwards
#[derive(Debug, Deserialize)]
pub(crate) struct RawCatalogItem {
    pub stage_code: String,
    pub work_code: String,
    pub name: String,
    pub unit: String,
    pub base_price: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl RawCatalogItem {
    pub(crate) fn into_item(self) -> Result<CatalogItem> {
        if !(self.base_price.is_finite() && self.base_price >= 0.0) {
            return Err(Error::Catalog(format!(
                "{}: base_price must be non-negative, got {}",
                self.work_code, self.base_price
            )));
        }
        Ok(CatalogItem {
            stage_code: self.stage_code.parse()?,
            work_code: self.work_code.trim().to_string(),
            name: self.name,
            unit: self.unit.parse()?,
            base_price: self.base_price,
            is_active: self.is_active,
        })
    }
}

/// Container for parsing catalog TOML
#[derive(Debug, Deserialize)]
struct CatalogFile {
    items: Vec<RawCatalogItem>,
}

/// Reference prices per work type
const BUILTIN_PRICES: [(StageCode, &str, &str, Unit, f64); 17] = [
    (StageCode::Plaster, "PLASTER_WALLS", "Штукатурка стен по маякам", Unit::SquareMeter, 720.0),
    (StageCode::ElecRough, "ELEC_POINT", "Электроточка (розетка/выключатель)", Unit::Point, 950.0),
    (StageCode::PlumbRough, "PLUMB_POINT", "Сантехническая точка", Unit::Point, 1200.0),
    (StageCode::Screed, "SCREED_BASE", "Стяжка пола 40мм", Unit::SquareMeter, 650.0),
    (StageCode::Gkl, "GKL_CEILING", "Потолок из ГКЛ в 1 слой", Unit::SquareMeter, 1200.0),
    (StageCode::Gkl, "GKL_PARTITION", "Перегородка из ГКЛ", Unit::SquareMeter, 1500.0),
    (StageCode::Tile, "TILE_WALLS", "Укладка плитки на стены", Unit::SquareMeter, 1500.0),
    (StageCode::Tile, "TILE_FLOOR", "Укладка плитки на пол", Unit::SquareMeter, 1300.0),
    (StageCode::Floor, "FLOOR_LAMINATE", "Укладка ламината", Unit::SquareMeter, 600.0),
    (StageCode::Floor, "FLOOR_PARQUET", "Укладка паркета", Unit::SquareMeter, 1200.0),
    (StageCode::PaintPrep, "PUTTY", "Шпаклевка стен под окраску", Unit::SquareMeter, 350.0),
    (StageCode::Paint, "PAINT_WALLS", "Окраска стен", Unit::SquareMeter, 300.0),
    (StageCode::Paint, "PAINT_CEILING", "Окраска потолков", Unit::SquareMeter, 280.0),
    (StageCode::Finish, "FIN_TOILET", "Установка унитаза", Unit::Piece, 2500.0),
    (StageCode::Finish, "FIN_SINK", "Установка раковины", Unit::Piece, 2000.0),
    (StageCode::Finish, "FIN_BASEBOARD", "Установка плинтуса", Unit::LinearMeter, 250.0),
    (StageCode::Finish, "FIN_DOOR", "Установка межкомнатной двери", Unit::Piece, 3500.0),
];

/// Price catalog keyed by stage and work code
#[derive(Debug, Clone, Default)]
pub struct PriceCatalogLoader {
    items: HashMap<(StageCode, String), CatalogItem>,
}

impl PriceCatalogLoader {
    /// Build from items; later duplicates replace earlier ones
    pub fn from_items(items: impl IntoIterator<Item = CatalogItem>) -> Self {
        let items = items
            .into_iter()
            .map(|item| ((item.stage_code, item.work_code.clone()), item))
            .collect();
        Self { items }
    }

    /// The reference catalog shipped with the tool
    pub fn builtin() -> Self {
        Self::from_items(BUILTIN_PRICES.iter().map(|(stage, code, name, unit, price)| CatalogItem {
            stage_code: *stage,
            work_code: code.to_string(),
            name: name.to_string(),
            unit: *unit,
            base_price: *price,
            is_active: true,
        }))
    }

    /// Load a catalog file; `.csv` is read as CSV, anything else as TOML
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.display().to_string()));
        }

        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

        let loader = if is_csv {
            Self::from_items(load_catalog_csv(path)?)
        } else {
            let content = fs::read_to_string(path)?;
            Self::load_from_str(&content)?
        };
        debug!(path = %path.display(), items = loader.count(), "price catalog loaded");
        Ok(loader)
    }

    /// Load a catalog from TOML string
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(toml_content)
            .map_err(|e| Error::Catalog(format!("Failed to parse catalog TOML: {}", e)))?;

        let items = file
            .items
            .into_iter()
            .map(RawCatalogItem::into_item)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_items(items))
    }

    pub fn get(&self, stage: StageCode, work_code: &str) -> Option<&CatalogItem> {
        self.items.get(&(stage, work_code.to_string()))
    }

    /// All items sorted by stage then work code
    pub fn all_items(&self) -> Vec<&CatalogItem> {
        let mut items: Vec<&CatalogItem> = self.items.values().collect();
        items.sort_by(|a, b| {
            a.stage_code
                .cmp(&b.stage_code)
                .then_with(|| a.work_code.cmp(&b.work_code))
        });
        items
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }
}

impl PriceCatalog for PriceCatalogLoader {
    fn lookup(&self, stage: StageCode, work_code: &str) -> Option<f64> {
        self.get(stage, work_code)
            .filter(|item| item.is_active)
            .map(|item| item.base_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TEST_TOML: &str = r#"
[[items]]
stage_code = "PLASTER"
work_code = "PLASTER_WALLS"
name = "Штукатурка стен по маякам"
unit = "м²"
base_price = 800.0

[[items]]
stage_code = "finish"
work_code = "FIN_DOOR"
name = "Установка межкомнатной двери"
unit = "шт"
base_price = 3900.0
is_active = false
"#;

    #[test]
    fn test_load_from_str() {
        let catalog = PriceCatalogLoader::load_from_str(TEST_TOML).unwrap();
        assert_eq!(catalog.count(), 2);
        assert_eq!(catalog.lookup(StageCode::Plaster, "PLASTER_WALLS"), Some(800.0));
        assert_eq!(
            catalog.get(StageCode::Finish, "FIN_DOOR").map(|i| i.unit),
            Some(Unit::Piece)
        );
    }

    #[test]
    fn test_inactive_items_ignored() {
        let catalog = PriceCatalogLoader::load_from_str(TEST_TOML).unwrap();
        assert_eq!(catalog.lookup(StageCode::Finish, "FIN_DOOR"), None);
    }

    #[test]
    fn test_lookup_requires_matching_stage() {
        let catalog = PriceCatalogLoader::load_from_str(TEST_TOML).unwrap();
        assert_eq!(catalog.lookup(StageCode::Paint, "PLASTER_WALLS"), None);
    }

    #[test]
    fn test_unknown_stage_rejected() {
        let toml = r#"
[[items]]
stage_code = "ROOFING"
work_code = "ROOF"
name = "Кровля"
unit = "м²"
base_price = 1.0
"#;
        assert!(matches!(
            PriceCatalogLoader::load_from_str(toml),
            Err(Error::Catalog(_))
        ));
    }

    #[test]
    fn test_negative_price_rejected() {
        let toml = TEST_TOML.replace("800.0", "-1.0");
        assert!(PriceCatalogLoader::load_from_str(&toml).is_err());
    }

    #[test]
    fn test_builtin_covers_engine_work_codes() {
        let catalog = PriceCatalogLoader::builtin();
        assert_eq!(catalog.count(), 17);
        assert_eq!(catalog.lookup(StageCode::Screed, "SCREED_BASE"), Some(650.0));
        assert_eq!(catalog.lookup(StageCode::Finish, "FIN_BASEBOARD"), Some(250.0));
        let first = catalog.all_items()[0];
        assert_eq!(first.stage_code, StageCode::Plaster);
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(TEST_TOML.as_bytes()).unwrap();
        let catalog = PriceCatalogLoader::load_from_file(file.path()).unwrap();
        assert_eq!(catalog.count(), 2);
    }

    #[test]
    fn test_missing_file() {
        let err = PriceCatalogLoader::load_from_file(Path::new("/no/such/catalog.toml")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }
}
