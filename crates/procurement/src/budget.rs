//! Budget alerts and edge-triggered threshold-crossing detection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use siteproc_core::{JobSiteId, Money, TenantId};

use crate::job_site::BudgetCommit;

/// Which threshold an alert reports.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetAlertKind {
    EightyPercent,
    HundredPercent,
    LargeOrder,
}

/// An immutable record of one threshold-crossing event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetAlert {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub job_site_id: JobSiteId,
    pub kind: BudgetAlertKind,
    /// The order amount that caused the crossing.
    pub amount: Money,
    /// Committed spend after the crossing order.
    pub committed: Money,
    pub budget_total: Option<Money>,
    pub message: String,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
}

impl BudgetAlert {
    pub fn new(
        tenant_id: TenantId,
        job_site_id: JobSiteId,
        kind: BudgetAlertKind,
        commit: &BudgetCommit,
        created_at: DateTime<Utc>,
    ) -> Self {
        let message = match kind {
            BudgetAlertKind::EightyPercent => format!(
                "budget 80% reached: {} of {} committed",
                commit.after,
                commit.budget_total.unwrap_or(Money::ZERO)
            ),
            BudgetAlertKind::HundredPercent => format!(
                "budget exceeded: {} of {} committed",
                commit.after,
                commit.budget_total.unwrap_or(Money::ZERO)
            ),
            BudgetAlertKind::LargeOrder => {
                format!("large single order: {}", commit.amount)
            }
        };

        Self {
            id: Uuid::now_v7(),
            tenant_id,
            job_site_id,
            kind,
            amount: commit.amount,
            committed: commit.after,
            budget_total: commit.budget_total,
            message,
            seen: false,
            created_at,
        }
    }
}

/// Thresholds crossed by one committed-spend increment, in ascending order.
///
/// Detection is edge-triggered: a threshold fires iff the committed ratio
/// was below it before the increment and at-or-above it after. Re-checking
/// the level alone would re-alert on every later order, so callers must feed
/// the exact before/after snapshot of one serialized commit. A single large
/// order can cross 80% and 100% at once and then reports both.
pub fn threshold_crossings(commit: &BudgetCommit) -> Vec<BudgetAlertKind> {
    let Some(total) = commit.budget_total else {
        return Vec::new();
    };
    if total.cents() <= 0 {
        return Vec::new();
    }

    // Exact integer comparison: before/total < pct/100 <= after/total.
    // Widened to i128 so `cents * 100` cannot overflow.
    let crossed = |pct: i128| {
        let t = total.cents() as i128;
        let before = commit.before.cents() as i128 * 100;
        let after = commit.after.cents() as i128 * 100;
        before < t * pct && after >= t * pct
    };

    let mut kinds = Vec::new();
    if crossed(80) {
        kinds.push(BudgetAlertKind::EightyPercent);
    }
    if crossed(100) {
        kinds.push(BudgetAlertKind::HundredPercent);
    }
    kinds
}

/// Whether an order amount alone warrants a `LargeOrder` alert.
///
/// Independent of `budget_total`; strictly greater than the threshold.
pub fn is_large_order(amount: Money, large_order_threshold: Money) -> bool {
    amount > large_order_threshold
}
