//! Read-only tenant settings consumed by the engine.

use serde::{Deserialize, Serialize};

use siteproc_core::{Money, TenantId};
use siteproc_suppliers::PaymentBlob;

/// Which cost function ranks the supplier pool.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplierPreference {
    /// Rank by concurrent price lookup, global minimum wins.
    Cheapest,
    /// Rank by great-circle distance to the nearest branch.
    Fastest,
}

/// How placed orders should reach the job site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "mode")]
pub enum DeliveryMode {
    Pickup,
    Deliver { address: String },
}

impl DeliveryMode {
    pub fn delivery_address(&self) -> Option<&str> {
        match self {
            DeliveryMode::Pickup => None,
            DeliveryMode::Deliver { address } => Some(address),
        }
    }
}

/// Per-tenant procurement policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySettings {
    pub tenant_id: TenantId,
    pub preference: SupplierPreference,
    /// Orders strictly above this amount raise a `LargeOrder` alert.
    pub large_order_threshold: Money,
    pub delivery: DeliveryMode,
    /// Opaque payment data forwarded to adapters at checkout, never parsed
    /// or logged by the engine.
    pub payment: Option<PaymentBlob>,
}

impl CompanySettings {
    /// Conservative defaults: cheapest ranking, 500.00 large-order
    /// threshold, pickup.
    pub fn defaults(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            preference: SupplierPreference::Cheapest,
            large_order_threshold: Money::from_cents(50_000),
            delivery: DeliveryMode::Pickup,
            payment: None,
        }
    }
}
