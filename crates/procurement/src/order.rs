//! The persisted outcome of one dispatch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use siteproc_core::{JobSiteId, OrderId, RequestId, TenantId};
use siteproc_suppliers::SupplierKind;

use crate::cancellation::CancellationWindow;

/// Terminal status of a supplier order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// The backend confirmed the order.
    Confirmed,
    /// Automation filled the cart but could not check out; a human
    /// completes the purchase.
    InCart,
    /// Every adapter in the fallback chain failed.
    Failed,
}

/// Outcome of one dispatch, created exactly once per eligible approved
/// request and never mutated in place by the engine (only its cancellation
/// window tracks redemption).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierOrder {
    pub id: OrderId,
    pub tenant_id: TenantId,
    pub request_id: RequestId,
    pub job_site_id: JobSiteId,
    pub supplier: SupplierKind,
    /// Order id assigned by the backend; absent for in-cart and failed
    /// outcomes.
    pub backend_order_id: Option<String>,
    pub status: OrderStatus,
    /// Why this supplier ended up taking (or failing) the order.
    pub reason: String,
    pub cancellation: CancellationWindow,
    pub created_at: DateTime<Utc>,
}

impl SupplierOrder {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tenant_id: TenantId,
        request_id: RequestId,
        job_site_id: JobSiteId,
        supplier: SupplierKind,
        status: OrderStatus,
        backend_order_id: Option<String>,
        reason: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OrderId::new(),
            tenant_id,
            request_id,
            job_site_id,
            supplier,
            backend_order_id,
            status,
            reason: reason.into(),
            cancellation: CancellationWindow::mint(created_at),
            created_at,
        }
    }
}
