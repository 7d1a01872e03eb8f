use serde::{Deserialize, Serialize};

use siteproc_core::{Money, TenantId};

/// One priced product in a tenant's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub tenant_id: TenantId,
    /// Product name as maintained by catalog admins, e.g. "Gravel 0-32mm".
    pub name: String,
    /// Unit the price refers to, e.g. "bag", "m3".
    pub unit: String,
    pub unit_price: Money,
}

impl CatalogEntry {
    /// Whether this entry prices the given free-text product description.
    ///
    /// Matching is a case-insensitive substring check in both directions:
    /// "gravel" matches "Gravel 0-32mm" and vice versa. Name collisions can
    /// therefore price the wrong product; see `best_unit_price`.
    pub fn matches(&self, product_text: &str) -> bool {
        let name = self.name.to_lowercase();
        let text = product_text.trim().to_lowercase();
        if text.is_empty() {
            return false;
        }
        name.contains(&text) || text.contains(&name)
    }
}

/// Best known unit price for a free-text product: the minimum price among
/// matching entries, or `None` when nothing matches.
///
/// The substring match is deliberately loose (it mirrors how requesters type
/// product names) and can collide across similarly named products. Callers
/// treat the result as an estimate, never as a binding quote.
pub fn best_unit_price(entries: &[CatalogEntry], product_text: &str) -> Option<Money> {
    entries
        .iter()
        .filter(|e| e.matches(product_text))
        .map(|e| e.unit_price)
        .min()
}
