//! The budget ledger: committed spend plus edge-triggered alerting.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use siteproc_catalog::best_unit_price;
use siteproc_procurement::{
    is_large_order, threshold_crossings, BudgetAlert, BudgetAlertKind, CompanySettings, Request,
};

use crate::error::ProcurementError;
use crate::notify::{fan_out, NotificationEvent, Notifier};
use crate::stores::{AlertStore, CatalogStore, JobSiteStore, UserDirectory};

/// Runs once per approved request, on the synchronous path of the approval.
///
/// Prices the request against the catalog, commits the spend under the
/// job-site lock, and emits at most one alert per crossing event. The caller
/// treats every error here as `LedgerUpdateFailed`: logged, swallowed, and
/// never allowed to fail the approval itself.
pub struct BudgetLedger {
    catalog: Arc<dyn CatalogStore>,
    job_sites: Arc<dyn JobSiteStore>,
    alerts: Arc<dyn AlertStore>,
    directory: Arc<dyn UserDirectory>,
    notifier: Arc<dyn Notifier>,
}

impl BudgetLedger {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        job_sites: Arc<dyn JobSiteStore>,
        alerts: Arc<dyn AlertStore>,
        directory: Arc<dyn UserDirectory>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            catalog,
            job_sites,
            alerts,
            directory,
            notifier,
        }
    }

    /// Record an approval and return the alerts it raised.
    ///
    /// A product with no catalog match commits nothing and raises nothing;
    /// an unknown price must not block procurement.
    pub async fn record_approval(
        &self,
        request: &Request,
        settings: &CompanySettings,
        now: DateTime<Utc>,
    ) -> Result<Vec<BudgetAlert>, ProcurementError> {
        let entries = self
            .catalog
            .entries(request.tenant_id)
            .map_err(ProcurementError::LedgerUpdateFailed)?;

        let Some(unit_price) = best_unit_price(&entries, &request.product) else {
            debug!(
                request_id = %request.id,
                product = %request.product,
                "no catalog price; skipping budget tracking for this request"
            );
            return Ok(Vec::new());
        };

        let amount = unit_price.times(request.quantity);

        let site = self
            .job_sites
            .get(request.tenant_id, request.job_site_id)
            .map_err(ProcurementError::LedgerUpdateFailed)?
            .ok_or(ProcurementError::LedgerUpdateFailed(
                crate::stores::StoreError::NotFound,
            ))?;

        // Increment and snapshot happen inside the store's critical section;
        // crossings are checked against exactly that snapshot.
        let commit = self
            .job_sites
            .commit_spend(request.tenant_id, request.job_site_id, amount)
            .map_err(ProcurementError::LedgerUpdateFailed)?;

        let mut kinds = threshold_crossings(&commit);
        if is_large_order(amount, settings.large_order_threshold) {
            kinds.push(BudgetAlertKind::LargeOrder);
        }

        let mut raised = Vec::with_capacity(kinds.len());
        for kind in kinds {
            let alert = BudgetAlert::new(
                request.tenant_id,
                request.job_site_id,
                kind,
                &commit,
                now,
            );
            self.alerts
                .insert(alert.clone())
                .map_err(ProcurementError::LedgerUpdateFailed)?;
            raised.push(alert);
        }

        if !raised.is_empty() {
            let recipients = match self.directory.office_and_admin_users(request.tenant_id) {
                Ok(users) => users,
                Err(error) => {
                    warn!(%error, "could not resolve alert recipients; alerts persisted unseen");
                    Vec::new()
                }
            };

            for alert in &raised {
                let event = NotificationEvent::BudgetAlert {
                    job_site: site.name.clone(),
                    kind: alert.kind,
                    amount: alert.amount,
                    committed: alert.committed,
                    budget_total: alert.budget_total,
                    message: alert.message.clone(),
                };
                fan_out(self.notifier.as_ref(), &recipients, &event).await;
            }
        }

        Ok(raised)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use siteproc_catalog::CatalogEntry;
    use siteproc_core::{Money, TenantId, UserId};
    use siteproc_procurement::{JobSite, Urgency};

    use crate::notify::InMemoryNotifier;
    use crate::stores::{
        InMemoryAlertStore, InMemoryCatalogStore, InMemoryJobSiteStore, InMemoryUserDirectory,
    };

    struct Fixture {
        tenant: TenantId,
        catalog: Arc<InMemoryCatalogStore>,
        job_sites: Arc<InMemoryJobSiteStore>,
        alerts: Arc<InMemoryAlertStore>,
        directory: Arc<InMemoryUserDirectory>,
        notifier: Arc<InMemoryNotifier>,
        ledger: BudgetLedger,
    }

    impl Fixture {
        fn new() -> Self {
            let catalog = Arc::new(InMemoryCatalogStore::new());
            let job_sites = Arc::new(InMemoryJobSiteStore::new());
            let alerts = Arc::new(InMemoryAlertStore::new());
            let directory = Arc::new(InMemoryUserDirectory::new());
            let notifier = Arc::new(InMemoryNotifier::new());
            let ledger = BudgetLedger::new(
                catalog.clone(),
                job_sites.clone(),
                alerts.clone(),
                directory.clone(),
                notifier.clone(),
            );
            Self {
                tenant: TenantId::new(),
                catalog,
                job_sites,
                alerts,
                directory,
                notifier,
                ledger,
            }
        }

        fn site(&self, budget_total: Option<i64>) -> JobSite {
            let mut site = JobSite::new(self.tenant, "Riverside towers");
            site.budget_total = budget_total.map(Money::from_cents);
            self.job_sites.insert(site.clone()).unwrap();
            site
        }

        fn price(&self, name: &str, cents: i64) {
            self.catalog
                .insert(CatalogEntry {
                    tenant_id: self.tenant,
                    name: name.to_string(),
                    unit: "bag".to_string(),
                    unit_price: Money::from_cents(cents),
                })
                .unwrap();
        }

        fn request(&self, site: &JobSite, product: &str, quantity: i64) -> Request {
            Request::new(
                self.tenant,
                product,
                quantity,
                "bag",
                site.id,
                UserId::new(),
                Urgency::Normal,
                Utc::now(),
            )
            .unwrap()
        }

        /// Settings with the large-order threshold parked out of the way so
        /// crossing tests only see crossing alerts.
        fn settings(&self) -> CompanySettings {
            CompanySettings {
                large_order_threshold: Money::from_cents(i64::MAX),
                ..CompanySettings::defaults(self.tenant)
            }
        }
    }

    #[tokio::test]
    async fn one_order_can_raise_both_budget_alerts() {
        let f = Fixture::new();
        // budget_total 1000.00, committed 750.00, order 300.00 => 1050.00.
        let site = f.site(Some(100_000));
        f.job_sites
            .commit_spend(f.tenant, site.id, Money::from_cents(75_000))
            .unwrap();
        f.price("Cement 25kg", 7_500);
        let request = f.request(&site, "cement", 4);

        let raised = f
            .ledger
            .record_approval(&request, &f.settings(), Utc::now())
            .await
            .unwrap();

        assert_eq!(
            raised.iter().map(|a| a.kind).collect::<Vec<_>>(),
            vec![BudgetAlertKind::EightyPercent, BudgetAlertKind::HundredPercent]
        );
        assert_eq!(raised[0].committed, Money::from_cents(105_000));
    }

    #[tokio::test]
    async fn crossing_alerts_fire_exactly_once() {
        let f = Fixture::new();
        let site = f.site(Some(100_000));
        f.price("Cement 25kg", 1_000);

        // 0 -> 85%: crosses 80 once.
        let raised = f
            .ledger
            .record_approval(&f.request(&site, "cement", 85), &f.settings(), Utc::now())
            .await
            .unwrap();
        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].kind, BudgetAlertKind::EightyPercent);

        // 85% -> 95%: still above 80, no new crossing.
        let raised = f
            .ledger
            .record_approval(&f.request(&site, "cement", 10), &f.settings(), Utc::now())
            .await
            .unwrap();
        assert!(raised.is_empty());

        let stored = f.alerts.list(f.tenant, site.id).unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn unpriced_product_commits_nothing_and_never_fails() {
        let f = Fixture::new();
        let site = f.site(Some(100_000));
        let request = f.request(&site, "unobtainium", 10);

        let raised = f
            .ledger
            .record_approval(&request, &f.settings(), Utc::now())
            .await
            .unwrap();

        assert!(raised.is_empty());
        let stored = f.job_sites.get(f.tenant, site.id).unwrap().unwrap();
        assert_eq!(stored.budget_committed, Money::ZERO);
    }

    #[tokio::test]
    async fn large_order_fires_without_a_budget_total() {
        let f = Fixture::new();
        let site = f.site(None);
        // 600.00 > the 500.00 default threshold.
        f.price("Excavator rental", 60_000);
        let request = f.request(&site, "excavator rental", 1);

        let raised = f
            .ledger
            .record_approval(&request, &CompanySettings::defaults(f.tenant), Utc::now())
            .await
            .unwrap();

        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].kind, BudgetAlertKind::LargeOrder);
    }

    #[tokio::test]
    async fn alerts_fan_out_to_all_office_users() {
        let f = Fixture::new();
        let office_a = UserId::new();
        let office_b = UserId::new();
        f.directory.add_office_user(f.tenant, office_a);
        f.directory.add_office_user(f.tenant, office_b);

        let site = f.site(Some(100_000));
        f.price("Cement 25kg", 1_000);
        f.ledger
            .record_approval(&f.request(&site, "cement", 90), &f.settings(), Utc::now())
            .await
            .unwrap();

        assert_eq!(f.notifier.sent_to(office_a).len(), 1);
        assert_eq!(f.notifier.sent_to(office_b).len(), 1);
    }
}
