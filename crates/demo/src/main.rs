//! End-to-end demonstration against scripted backends.
//!
//! Wires the engine with in-memory stores and fake adapters, runs one
//! request through approval, selection and placement, and logs what a real
//! deployment would notify. Useful for eyeballing selection reasons and log
//! output without any backend automation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use siteproc_catalog::CatalogEntry;
use siteproc_core::{AccountId, Money, TenantId, UserId};
use siteproc_infra::stores::{
    InMemoryAccountStore, InMemoryAlertStore, InMemoryCatalogStore, InMemoryJobSiteStore,
    InMemoryOrderStore, InMemoryRequestStore, InMemorySettingsStore, InMemoryUserDirectory,
    AccountStore, CatalogStore, JobSiteStore, OrderStore, RequestStore,
};
use siteproc_infra::{
    ApprovalOrchestrator, BudgetLedger, InMemoryNotifier, OrchestratorDeps, PipelineWorker,
    ProcurementOutbox, SupplierSelector,
};
use siteproc_procurement::{JobSite, Request, Urgency};
use siteproc_suppliers::{
    AdapterRegistry, BranchDirectory, ConnectionStatus, Coordinates, Credentials, Geocoder,
    Placement, PlacementRequest, SupplierAccount, SupplierAdapter, SupplierKind,
};

/// Fake backend with a fixed price that always confirms.
struct FakeBackend {
    kind: SupplierKind,
    price: Money,
}

#[async_trait]
impl SupplierAdapter for FakeBackend {
    fn kind(&self) -> SupplierKind {
        self.kind
    }

    async fn test_connection(&self, _credentials: &Credentials) -> ConnectionStatus {
        ConnectionStatus::Connected
    }

    async fn price_lookup(&self, _credentials: &Credentials, _product_text: &str) -> Option<Money> {
        Some(self.price)
    }

    async fn place_order(
        &self,
        _credentials: &Credentials,
        _request: &PlacementRequest,
    ) -> Placement {
        Placement::Confirmed {
            backend_order_id: format!("{}-{}", self.kind.key().to_uppercase(), 1042),
        }
    }
}

struct NullGeocoder;

#[async_trait]
impl Geocoder for NullGeocoder {
    async fn resolve(&self, _address_text: &str) -> Option<Coordinates> {
        None
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    siteproc_observability::tracing::init_pretty();

    let tenant = TenantId::new();
    let requester = UserId::new();

    let requests = Arc::new(InMemoryRequestStore::new());
    let job_sites = Arc::new(InMemoryJobSiteStore::new());
    let orders = Arc::new(InMemoryOrderStore::new());
    let accounts = Arc::new(InMemoryAccountStore::new());
    let settings = Arc::new(InMemorySettingsStore::new());
    let catalog = Arc::new(InMemoryCatalogStore::new());
    let alerts = Arc::new(InMemoryAlertStore::new());
    let directory = Arc::new(InMemoryUserDirectory::new());
    let notifier = Arc::new(InMemoryNotifier::new());

    let site = JobSite::new(tenant, "Riverside towers")
        .with_address("Alexanderplatz 1, 10178 Berlin")
        .with_budget_total(Money::from_cents(500_000));
    job_sites.insert(site.clone())?;

    catalog.insert(CatalogEntry {
        tenant_id: tenant,
        name: "Cement 25kg".to_string(),
        unit: "bag".to_string(),
        unit_price: Money::from_cents(850),
    })?;

    let mut registry = AdapterRegistry::new();
    for (kind, cents) in [
        (SupplierKind::Buildmax, 899),
        (SupplierKind::Toolhaus, 850),
        (SupplierKind::Metrosupply, 905),
    ] {
        registry = registry.with_adapter(Arc::new(FakeBackend {
            kind,
            price: Money::from_cents(cents),
        }));
        accounts.insert(SupplierAccount {
            id: AccountId::new(),
            tenant_id: tenant,
            supplier: kind,
            credentials: Credentials::new("demo:demo"),
            active: true,
        })?;
    }

    let ledger = BudgetLedger::new(
        catalog.clone(),
        job_sites.clone(),
        alerts.clone(),
        directory.clone(),
        notifier.clone(),
    );
    let selector = SupplierSelector::new(Arc::new(NullGeocoder), BranchDirectory::builtin());
    let orchestrator = Arc::new(ApprovalOrchestrator::new(OrchestratorDeps {
        requests: requests.clone(),
        job_sites,
        orders: orders.clone(),
        accounts,
        settings,
        directory,
        registry,
        selector,
        notifier: notifier.clone(),
        outbox: Arc::new(ProcurementOutbox::default()),
        ledger,
    }));

    let request = Request::new(
        tenant,
        "cement",
        40,
        "bag",
        site.id,
        requester,
        Urgency::Normal,
        Utc::now(),
    )?;
    let request_id = request.id;
    requests.insert(request)?;

    let worker = PipelineWorker::new(orchestrator.clone())
        .with_poll_interval(Duration::from_millis(50))
        .spawn();

    orchestrator.approve(tenant, request_id).await?;

    // Give the worker a moment to drain the outbox.
    for _ in 0..100 {
        if orders.get_by_request(tenant, request_id)?.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    worker.stop().await;

    if let Some(order) = orders.get_by_request(tenant, request_id)? {
        info!(
            order_id = %order.id,
            supplier = %order.supplier,
            status = ?order.status,
            reason = %order.reason,
            cancel_until = %order.cancellation.expires_at(),
            "demo order placed"
        );
    }
    for (recipient, event) in notifier.sent() {
        info!(%recipient, ?event, "notification");
    }

    Ok(())
}
