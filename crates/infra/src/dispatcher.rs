//! Sequential fallback execution of the selector's choice.

use tracing::{info, warn};

use siteproc_suppliers::{Placement, PlacementRequest, PoolEntry, SupplierKind};

/// One failed placement attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub supplier: SupplierKind,
    pub error: String,
}

/// Outcome of walking the fallback chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Some adapter confirmed the order or left it in cart.
    Accepted {
        supplier: SupplierKind,
        placement: Placement,
        reason: String,
    },
    /// Every adapter in the chain failed.
    AllFailed { attempts: Vec<Attempt> },
}

impl Dispatch {
    /// Aggregate reason for an `AllFailed` outcome.
    pub fn all_failed_reason(attempts: &[Attempt]) -> String {
        let detail = attempts
            .iter()
            .map(|a| format!("{}: {}", a.supplier, a.error))
            .collect::<Vec<_>>()
            .join("; ");
        format!("all suppliers failed ({detail})")
    }
}

pub struct OrderDispatcher;

impl OrderDispatcher {
    /// Try the chosen adapter, then the rest of the pool in original order.
    ///
    /// Strictly sequential: placement drives real backend automation and
    /// running two adapters at once risks double placement. Each distinct
    /// adapter is attempted at most once, and an attempt is accepted the
    /// moment it reports confirmed or in-cart. When a fallback adapter
    /// accepts, the reason records which adapter was originally preferred
    /// and why it was skipped.
    pub async fn dispatch(
        pool: &[PoolEntry],
        chosen: usize,
        selection_reason: &str,
        request: &PlacementRequest,
    ) -> Dispatch {
        let mut attempts: Vec<Attempt> = Vec::new();

        let order = core::iter::once(chosen)
            .chain((0..pool.len()).filter(|i| *i != chosen));

        for index in order {
            let entry = &pool[index];
            let supplier = entry.kind();
            info!(%supplier, product = %request.product, "attempting order placement");

            match entry.adapter.place_order(&entry.credentials, request).await {
                Placement::Failed { error } => {
                    warn!(%supplier, %error, "placement attempt failed; trying next supplier");
                    attempts.push(Attempt { supplier, error });
                }
                placement => {
                    let reason = if attempts.is_empty() {
                        selection_reason.to_string()
                    } else {
                        let first = &attempts[0];
                        format!(
                            "{supplier} accepted after preferred supplier {} failed ({})",
                            first.supplier, first.error
                        )
                    };
                    return Dispatch::Accepted {
                        supplier,
                        placement,
                        reason,
                    };
                }
            }
        }

        Dispatch::AllFailed { attempts }
    }
}
