//! `siteproc-catalog` — the tenant product catalog the budget ledger prices
//! material requests against.

pub mod entry;

pub use entry::{best_unit_price, CatalogEntry};
