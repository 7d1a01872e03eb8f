//! Outbound notification fan-out.
//!
//! The engine only defines the event shapes and the best-effort delivery
//! contract; rendering and transport (mail, push, chat) live outside. A
//! failed delivery to one recipient never affects the others and never
//! propagates into the pipeline.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

use siteproc_core::{Money, RequestId, UserId};
use siteproc_procurement::{BudgetAlertKind, CancelToken};
use siteproc_suppliers::SupplierKind;

/// One outbound notification, carrying the figures needed to render it.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    /// The requester's material request was decided.
    RequestDecision {
        request_id: RequestId,
        product: String,
        approved: bool,
    },
    /// A backend confirmed the order; it is reversible until the window
    /// expires.
    OrderConfirmed {
        request_id: RequestId,
        product: String,
        quantity: i64,
        unit: String,
        job_site: String,
        supplier: SupplierKind,
        reason: String,
        backend_order_id: String,
        cancel_token: CancelToken,
        cancel_expires_at: DateTime<Utc>,
    },
    /// Automation left the order in the backend's cart; a human completes
    /// checkout.
    OrderInCart {
        request_id: RequestId,
        product: String,
        quantity: i64,
        unit: String,
        job_site: String,
        supplier: SupplierKind,
        reason: String,
    },
    /// No backend could take the order.
    OrderFailed {
        request_id: RequestId,
        product: String,
        quantity: i64,
        unit: String,
        job_site: String,
        reason: String,
    },
    /// A budget threshold was crossed.
    BudgetAlert {
        job_site: String,
        kind: BudgetAlertKind,
        amount: Money,
        committed: Money,
        budget_total: Option<Money>,
        message: String,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Delivers one event to one recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: UserId, event: &NotificationEvent)
        -> Result<(), NotifyError>;
}

/// Best-effort delivery to a recipient list.
///
/// Idempotent from the pipeline's point of view; per-recipient failures are
/// logged and swallowed.
pub async fn fan_out(notifier: &dyn Notifier, recipients: &[UserId], event: &NotificationEvent) {
    for recipient in recipients {
        if let Err(error) = notifier.notify(*recipient, event).await {
            warn!(%recipient, %error, "notification delivery failed; continuing fan-out");
        }
    }
}

/// Records deliveries instead of sending them. For tests and local runs.
#[derive(Debug, Default)]
pub struct InMemoryNotifier {
    sent: Mutex<Vec<(UserId, NotificationEvent)>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(UserId, NotificationEvent)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, recipient: UserId) -> Vec<NotificationEvent> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| *r == recipient)
            .map(|(_, e)| e.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn notify(
        &self,
        recipient: UserId,
        event: &NotificationEvent,
    ) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push((recipient, event.clone()));
        Ok(())
    }
}
