//! Material requests and their single-mutation lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use siteproc_core::{DomainError, DomainResult, JobSiteId, RequestId, TenantId, UserId};
use siteproc_suppliers::SupplierKind;

/// How soon the requester needs the material on site.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Normal,
    Urgent,
}

/// Request lifecycle: created pending, decided exactly once.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// A material request raised against a job site.
///
/// Only the approval decision mutates a request, and only once: `pending →
/// {approved, rejected}`. Approval is what triggers the procurement
/// pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub tenant_id: TenantId,
    pub product: String,
    pub quantity: i64,
    pub unit: String,
    pub job_site_id: JobSiteId,
    pub requester: UserId,
    pub urgency: Urgency,
    /// Requester's optional backend preference; honored when that backend is
    /// in the tenant's pool.
    pub preferred_supplier: Option<SupplierKind>,
    status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl Request {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tenant_id: TenantId,
        product: impl Into<String>,
        quantity: i64,
        unit: impl Into<String>,
        job_site_id: JobSiteId,
        requester: UserId,
        urgency: Urgency,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let product = product.into();
        if product.trim().is_empty() {
            return Err(DomainError::validation("product must not be empty"));
        }
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        Ok(Self {
            id: RequestId::new(),
            tenant_id,
            product,
            quantity,
            unit: unit.into(),
            job_site_id,
            requester,
            urgency,
            preferred_supplier: None,
            status: RequestStatus::Pending,
            created_at,
            decided_at: None,
        })
    }

    pub fn with_preferred_supplier(mut self, supplier: SupplierKind) -> Self {
        self.preferred_supplier = Some(supplier);
        self
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    /// `pending → approved`. Rejects any second decision.
    pub fn approve(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.decide(RequestStatus::Approved, now)
    }

    /// `pending → rejected`. Rejects any second decision.
    pub fn reject(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.decide(RequestStatus::Rejected, now)
    }

    fn decide(&mut self, decision: RequestStatus, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status.is_terminal() {
            return Err(DomainError::invariant(format!(
                "request {} already decided ({:?})",
                self.id, self.status
            )));
        }
        self.status = decision;
        self.decided_at = Some(now);
        Ok(())
    }
}
