//! Domain services

pub mod merger;
pub mod pricing;
pub mod quantity;
pub mod sanity_checker;
pub mod validation;

pub use merger::merge;
pub use pricing::price_work_items;
pub use quantity::QuantityEngine;
pub use sanity_checker::{count_living_rooms, SanityChecker};
pub use validation::validate_analysis;
