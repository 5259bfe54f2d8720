//! Collaborator traits implemented outside the domain

use smeta_types::StageCode;

/// Source of unit prices for work items
pub trait PriceCatalog {
    /// Base price for a work code, `None` when the catalog has no active entry
    fn lookup(&self, stage: StageCode, work_code: &str) -> Option<f64>;
}

impl<T: PriceCatalog + ?Sized> PriceCatalog for &T {
    fn lookup(&self, stage: StageCode, work_code: &str) -> Option<f64> {
        (**self).lookup(stage, work_code)
    }
}

impl<T: PriceCatalog + ?Sized> PriceCatalog for Box<T> {
    fn lookup(&self, stage: StageCode, work_code: &str) -> Option<f64> {
        (**self).lookup(stage, work_code)
    }
}
