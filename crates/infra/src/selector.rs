//! Ranking the adapter pool for one request.
//!
//! Pure selection: nothing is ordered here, and every external call (price
//! lookup, geocoding) goes through an injectable contract. The outcome
//! always carries a human-readable justification, because stakeholders see
//! it verbatim in the order notification.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::time::timeout;
use tracing::{debug, warn};

use siteproc_core::Money;
use siteproc_procurement::SupplierPreference;
use siteproc_suppliers::{BranchDirectory, Geocoder, PoolEntry, SupplierKind};

/// Outcome of ranking the pool.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Selected {
        /// Index into the pool handed to `select`.
        index: usize,
        kind: SupplierKind,
        reason: String,
    },
    /// The pool was empty: nothing to rank, nothing to try. Distinct from
    /// any runtime failure.
    NoSupplierConfigured,
}

/// Adapters drive real backend UIs; a lookup that has not answered by now
/// is treated as "no price" for that adapter only.
const PRICE_LOOKUP_TIMEOUT: Duration = Duration::from_secs(60);

pub struct SupplierSelector {
    geocoder: Arc<dyn Geocoder>,
    branches: BranchDirectory,
    price_timeout: Duration,
}

impl SupplierSelector {
    pub fn new(geocoder: Arc<dyn Geocoder>, branches: BranchDirectory) -> Self {
        Self {
            geocoder,
            branches,
            price_timeout: PRICE_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_price_timeout(mut self, price_timeout: Duration) -> Self {
        self.price_timeout = price_timeout;
        self
    }

    /// Rank `pool` and pick one adapter.
    ///
    /// A `hint` naming a pooled backend short-circuits ranking; otherwise
    /// the tenant preference decides. Both ranking functions degrade to the
    /// first pool entry, with an explicit reason, rather than guessing.
    pub async fn select(
        &self,
        pool: &[PoolEntry],
        preference: SupplierPreference,
        product_text: &str,
        site_address: Option<&str>,
        hint: Option<SupplierKind>,
    ) -> Selection {
        if pool.is_empty() {
            return Selection::NoSupplierConfigured;
        }

        if let Some(preferred) = hint {
            if let Some(index) = pool.iter().position(|e| e.kind() == preferred) {
                return Selection::Selected {
                    index,
                    kind: preferred,
                    reason: format!("requester preferred {preferred}"),
                };
            }
        }

        match preference {
            SupplierPreference::Cheapest => self.select_cheapest(pool, product_text).await,
            SupplierPreference::Fastest => self.select_fastest(pool, site_address).await,
        }
    }

    async fn select_cheapest(&self, pool: &[PoolEntry], product_text: &str) -> Selection {
        // One concurrent lookup per adapter; a slow, hung or broken backend
        // costs only its own entry ("no price"), never the batch.
        let prices: Vec<Option<Money>> = join_all(pool.iter().map(|e| async {
            match timeout(
                self.price_timeout,
                e.adapter.price_lookup(&e.credentials, product_text),
            )
            .await
            {
                Ok(price) => price,
                Err(_) => {
                    warn!(supplier = %e.kind(), "price lookup timed out; treating as unknown");
                    None
                }
            }
        }))
        .await;

        let summary = pool
            .iter()
            .zip(&prices)
            .map(|(e, p)| match p {
                Some(price) => format!("{} {price}", e.kind()),
                None => format!("{} no price", e.kind()),
            })
            .collect::<Vec<_>>()
            .join(", ");

        debug!(product = product_text, %summary, "price comparison complete");

        let best = prices
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|price| (i, price)))
            .min_by_key(|(_, price)| *price);

        match best {
            Some((index, price)) => {
                let kind = pool[index].kind();
                Selection::Selected {
                    index,
                    kind,
                    reason: format!("cheapest: {summary}; picked {kind} at {price}"),
                }
            }
            None => {
                let kind = pool[0].kind();
                Selection::Selected {
                    index: 0,
                    kind,
                    reason: format!(
                        "no backend returned a price ({summary}); \
                         defaulting to first configured supplier {kind}"
                    ),
                }
            }
        }
    }

    async fn select_fastest(&self, pool: &[PoolEntry], site_address: Option<&str>) -> Selection {
        let first = pool[0].kind();

        let address = match site_address.map(str::trim) {
            Some(a) if !a.is_empty() => a,
            _ => {
                return Selection::Selected {
                    index: 0,
                    kind: first,
                    reason: format!(
                        "job site has no address; defaulting to first configured supplier {first}"
                    ),
                };
            }
        };

        let Some(at) = self.geocoder.resolve(address).await else {
            return Selection::Selected {
                index: 0,
                kind: first,
                reason: format!(
                    "address could not be resolved; \
                     defaulting to first configured supplier {first}"
                ),
            };
        };

        // Ties keep pool order: strict `<` never replaces an equal distance.
        let mut best: Option<(usize, siteproc_suppliers::BranchMatch)> = None;
        for (index, entry) in pool.iter().enumerate() {
            if let Some(m) = self.branches.nearest(entry.kind(), at) {
                let closer = best
                    .as_ref()
                    .is_none_or(|(_, b)| m.distance_km < b.distance_km);
                if closer {
                    best = Some((index, m));
                }
            }
        }

        match best {
            Some((index, m)) => {
                let kind = pool[index].kind();
                Selection::Selected {
                    index,
                    kind,
                    reason: format!(
                        "fastest: nearest branch {} at {:.1} km",
                        m.branch_name, m.distance_km
                    ),
                }
            }
            None => Selection::Selected {
                index: 0,
                kind: first,
                reason: format!(
                    "no branch locations known for any configured supplier; \
                     defaulting to {first}"
                ),
            },
        }
    }
}
