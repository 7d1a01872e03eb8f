//! The contract every backend automation adapter implements.

use async_trait::async_trait;

use siteproc_core::Money;

use crate::credentials::{Credentials, PaymentBlob};
use crate::kind::SupplierKind;

/// Outcome of a connectivity test against a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Failed { error: String },
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}

/// Everything an adapter needs to place one order.
#[derive(Debug, Clone)]
pub struct PlacementRequest {
    /// Free-text product description as entered by the requester.
    pub product: String,
    pub quantity: i64,
    pub unit: String,
    /// Delivery address, or `None` for pickup.
    pub delivery_address: Option<String>,
    /// Opaque payment data, forwarded untouched.
    pub payment: Option<PaymentBlob>,
}

/// Terminal outcome of one placement attempt.
///
/// Exactly one variant is meaningful per call. `InCart` is a legitimate
/// non-failure: the automation filled the cart but could not complete
/// checkout, and a human finishes the purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Confirmed { backend_order_id: String },
    InCart,
    Failed { error: String },
}

impl Placement {
    /// An attempt is accepted the moment it is confirmed or left in cart.
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Placement::Failed { .. })
    }
}

/// One external retail backend: price lookup, order placement, connectivity
/// test.
///
/// Implementations drive real retailer UIs and can take tens of seconds per
/// call. They must be failure-contained: `price_lookup` reports an unknown
/// price as `None` rather than erroring, and `place_order` folds every
/// internal failure into [`Placement::Failed`].
#[async_trait]
pub trait SupplierAdapter: Send + Sync {
    /// Which backend this adapter drives.
    fn kind(&self) -> SupplierKind;

    /// Verify the credentials can log in to the backend.
    async fn test_connection(&self, credentials: &Credentials) -> ConnectionStatus;

    /// Best price the backend offers for a free-text product, if any.
    async fn price_lookup(&self, credentials: &Credentials, product_text: &str) -> Option<Money>;

    /// Attempt to place an order. Never panics; never left half-reported.
    async fn place_order(&self, credentials: &Credentials, request: &PlacementRequest)
        -> Placement;
}
