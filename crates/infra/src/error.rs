//! Engine-level error taxonomy.
//!
//! Per-adapter price failures never surface here: `price_lookup` reports
//! them as an unknown price, which only degrades selection quality. An
//! unresolvable address likewise degrades "fastest" to pool order inside the
//! selector. What remains are the failures a pipeline or approval call can
//! actually hit.

use thiserror::Error;

use siteproc_core::DomainError;

use crate::outbox::OutboxError;
use crate::stores::StoreError;

#[derive(Debug, Error)]
pub enum ProcurementError {
    /// The tenant has no active supplier account with a registered adapter.
    /// Distinct from a runtime failure: there was nothing to try.
    #[error("no supplier account configured")]
    NoSupplierConfigured,

    /// The budget ledger could not record the approval. Logged and
    /// swallowed by the caller: a missed alert is recoverable, a stuck
    /// approval is not.
    #[error("budget ledger update failed: {0}")]
    LedgerUpdateFailed(#[source] StoreError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Outbox(#[from] OutboxError),
}
