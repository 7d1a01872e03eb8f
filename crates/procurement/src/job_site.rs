//! Job sites and their budget counters.

use serde::{Deserialize, Serialize};

use siteproc_core::{JobSiteId, Money, TenantId};

/// A job site: the boundary budgets are tracked against.
///
/// `budget_committed` grows monotonically and is mutated only through the
/// job-site store's serialized `commit_spend` (or by out-of-scope admin
/// edits to `budget_total`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSite {
    pub id: JobSiteId,
    pub tenant_id: TenantId,
    pub name: String,
    pub address: Option<String>,
    pub budget_total: Option<Money>,
    pub budget_committed: Money,
}

impl JobSite {
    pub fn new(tenant_id: TenantId, name: impl Into<String>) -> Self {
        Self {
            id: JobSiteId::new(),
            tenant_id,
            name: name.into(),
            address: None,
            budget_total: None,
            budget_committed: Money::ZERO,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_budget_total(mut self, total: Money) -> Self {
        self.budget_total = Some(total);
        self
    }

    /// Add committed spend and return the before/after snapshot the ledger
    /// checks crossings against.
    ///
    /// Callers must hold whatever lock serializes commits for this site; the
    /// crossing check is only sound against the snapshot of one serialized
    /// read-modify-write.
    pub fn commit(&mut self, amount: Money) -> BudgetCommit {
        let before = self.budget_committed;
        self.budget_committed = before.plus(amount);
        BudgetCommit {
            budget_total: self.budget_total,
            before,
            after: self.budget_committed,
            amount,
        }
    }
}

/// Snapshot of one committed-spend increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetCommit {
    pub budget_total: Option<Money>,
    pub before: Money,
    pub after: Money,
    pub amount: Money,
}
