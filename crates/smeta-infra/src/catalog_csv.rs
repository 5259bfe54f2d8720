//! CSV loader for price catalogs
//!
//! Spreadsheet exports are often Windows-1251; UTF-8 is tried first.

use encoding_rs::WINDOWS_1251;
use smeta_types::{Error, Result};
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::price_catalog::{CatalogItem, RawCatalogItem};

/// Load catalog items from a CSV file
///
/// Expected header:
/// stage_code,work_code,name,unit,base_price[,is_active]
pub fn load_catalog_csv(path: &Path) -> Result<Vec<CatalogItem>> {
    let bytes = fs::read(path)?;
    parse_catalog_csv(&bytes)
}

pub(crate) fn parse_catalog_csv(bytes: &[u8]) -> Result<Vec<CatalogItem>> {
    let text = decode(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut items = Vec::new();
    for (row_idx, result) in reader.deserialize::<RawCatalogItem>().enumerate() {
        // +2: header is row 1
        let row_num = row_idx + 2;
        let raw = result.map_err(|e| Error::Catalog(format!("Row {}: {}", row_num, e)))?;
        let item = raw
            .into_item()
            .map_err(|e| Error::Catalog(format!("Row {}: {}", row_num, e)))?;
        items.push(item);
    }

    Ok(items)
}

fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let (decoded, _, had_errors) = WINDOWS_1251.decode(bytes);
            if had_errors {
                warn!("Some characters could not be decoded from Windows-1251");
            }
            decoded
        }
    }
}
