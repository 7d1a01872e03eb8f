//! End-to-end flow: request, approval, ledger, selection, dispatch,
//! cancellation window.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use siteproc_catalog::CatalogEntry;
use siteproc_core::{AccountId, Money, TenantId, UserId};
use siteproc_infra::stores::{
    AccountStore, AlertStore, CatalogStore, InMemoryAccountStore, InMemoryAlertStore,
    InMemoryCatalogStore, InMemoryJobSiteStore, InMemoryOrderStore, InMemoryRequestStore,
    InMemorySettingsStore, InMemoryUserDirectory, JobSiteStore, OrderStore, RequestStore,
    SettingsStore,
};
use siteproc_infra::{
    ApprovalOrchestrator, BudgetLedger, InMemoryNotifier, NotificationEvent, OrchestratorDeps,
    ProcurementOutbox, SupplierSelector,
};
use siteproc_procurement::{
    BudgetAlertKind, CompanySettings, DeliveryMode, JobSite, OrderStatus, Request, RequestStatus,
    SupplierPreference, Urgency,
};
use siteproc_suppliers::{
    AdapterRegistry, BranchDirectory, ConnectionStatus, Coordinates, Credentials, Geocoder,
    Placement, PlacementRequest, SupplierAccount, SupplierAdapter, SupplierKind,
};

/// Adapter scripted per backend: a price, and either a confirmation or a
/// failure.
struct ScriptedAdapter {
    kind: SupplierKind,
    price: Option<Money>,
    outcome: Placement,
}

#[async_trait]
impl SupplierAdapter for ScriptedAdapter {
    fn kind(&self) -> SupplierKind {
        self.kind
    }

    async fn test_connection(&self, _credentials: &Credentials) -> ConnectionStatus {
        ConnectionStatus::Connected
    }

    async fn price_lookup(&self, _credentials: &Credentials, _product_text: &str) -> Option<Money> {
        self.price
    }

    async fn place_order(
        &self,
        _credentials: &Credentials,
        _request: &PlacementRequest,
    ) -> Placement {
        self.outcome.clone()
    }
}

struct NullGeocoder;

#[async_trait]
impl Geocoder for NullGeocoder {
    async fn resolve(&self, _address_text: &str) -> Option<Coordinates> {
        None
    }
}

struct World {
    tenant: TenantId,
    office_user: UserId,
    requests: Arc<InMemoryRequestStore>,
    job_sites: Arc<InMemoryJobSiteStore>,
    orders: Arc<InMemoryOrderStore>,
    alerts: Arc<InMemoryAlertStore>,
    notifier: Arc<InMemoryNotifier>,
    orchestrator: ApprovalOrchestrator,
}

fn build_world(adapters: Vec<ScriptedAdapter>) -> World {
    let tenant = TenantId::new();
    let office_user = UserId::new();

    let requests = Arc::new(InMemoryRequestStore::new());
    let job_sites = Arc::new(InMemoryJobSiteStore::new());
    let orders = Arc::new(InMemoryOrderStore::new());
    let accounts = Arc::new(InMemoryAccountStore::new());
    let settings = Arc::new(InMemorySettingsStore::new());
    let catalog = Arc::new(InMemoryCatalogStore::new());
    let alerts = Arc::new(InMemoryAlertStore::new());
    let directory = Arc::new(InMemoryUserDirectory::new());
    let notifier = Arc::new(InMemoryNotifier::new());

    directory.add_office_user(tenant, office_user);

    settings
        .put(CompanySettings {
            preference: SupplierPreference::Cheapest,
            delivery: DeliveryMode::Deliver {
                address: "Baustelle Nord, 10115 Berlin".to_string(),
            },
            ..CompanySettings::defaults(tenant)
        })
        .unwrap();

    catalog
        .insert(CatalogEntry {
            tenant_id: tenant,
            name: "Cement 25kg".to_string(),
            unit: "bag".to_string(),
            unit_price: Money::from_cents(850),
        })
        .unwrap();

    let mut registry = AdapterRegistry::new();
    for adapter in adapters {
        let kind = adapter.kind;
        registry = registry.with_adapter(Arc::new(adapter));
        accounts
            .insert(SupplierAccount {
                id: AccountId::new(),
                tenant_id: tenant,
                supplier: kind,
                credentials: Credentials::new("secret"),
                active: true,
            })
            .unwrap();
    }

    let ledger = BudgetLedger::new(
        catalog.clone(),
        job_sites.clone(),
        alerts.clone(),
        directory.clone(),
        notifier.clone(),
    );
    let selector = SupplierSelector::new(Arc::new(NullGeocoder), BranchDirectory::builtin());
    let orchestrator = ApprovalOrchestrator::new(OrchestratorDeps {
        requests: requests.clone(),
        job_sites: job_sites.clone(),
        orders: orders.clone(),
        accounts: accounts.clone(),
        settings: settings.clone(),
        directory: directory.clone(),
        registry,
        selector,
        notifier: notifier.clone(),
        outbox: Arc::new(ProcurementOutbox::default()),
        ledger,
    });

    World {
        tenant,
        office_user,
        requests,
        job_sites,
        orders,
        alerts,
        notifier,
        orchestrator,
    }
}

fn add_site(world: &World, budget_cents: i64) -> JobSite {
    let site = JobSite::new(world.tenant, "Riverside towers")
        .with_budget_total(Money::from_cents(budget_cents));
    world.job_sites.insert(site.clone()).unwrap();
    site
}

fn add_request(world: &World, site: &JobSite, quantity: i64) -> Request {
    let request = Request::new(
        world.tenant,
        "cement",
        quantity,
        "bag",
        site.id,
        UserId::new(),
        Urgency::Normal,
        Utc::now(),
    )
    .unwrap();
    world.requests.insert(request.clone()).unwrap();
    request
}

#[tokio::test]
async fn approval_flows_through_to_a_confirmed_order() {
    let world = build_world(vec![
        ScriptedAdapter {
            kind: SupplierKind::Buildmax,
            price: Some(Money::from_cents(900)),
            outcome: Placement::Confirmed {
                backend_order_id: "BM-1".to_string(),
            },
        },
        ScriptedAdapter {
            kind: SupplierKind::Toolhaus,
            price: Some(Money::from_cents(850)),
            outcome: Placement::Confirmed {
                backend_order_id: "TH-1".to_string(),
            },
        },
    ]);
    let site = add_site(&world, 100_000);
    let request = add_request(&world, &site, 10);

    world
        .orchestrator
        .approve(world.tenant, request.id)
        .await
        .unwrap();
    world.orchestrator.run_pipeline_once().await.unwrap().unwrap();

    // ToolHaus is cheaper and wins.
    let order = world
        .orders
        .get_by_request(world.tenant, request.id)
        .unwrap()
        .unwrap();
    assert_eq!(order.supplier, SupplierKind::Toolhaus);
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.backend_order_id.as_deref(), Some("TH-1"));
    assert!(order.reason.contains("cheapest"), "{}", order.reason);

    // The window is live now, dead after two hours.
    let token = order.cancellation.token();
    assert!(order.cancellation.accepts(token, Utc::now()));
    assert!(!order
        .cancellation
        .accepts(token, order.created_at + Duration::minutes(121)));

    // Requester got decision + confirmation; the office user got the
    // confirmation too.
    let requester_events = world.notifier.sent_to(request.requester);
    assert!(matches!(
        requester_events[0],
        NotificationEvent::RequestDecision { approved: true, .. }
    ));
    assert!(matches!(
        requester_events[1],
        NotificationEvent::OrderConfirmed { .. }
    ));
    assert!(world
        .notifier
        .sent_to(world.office_user)
        .iter()
        .any(|e| matches!(e, NotificationEvent::OrderConfirmed { .. })));

    // 10 bags at the 8.50 catalog price.
    let stored = world
        .job_sites
        .get(world.tenant, site.id)
        .unwrap()
        .unwrap();
    assert_eq!(stored.budget_committed, Money::from_cents(8_500));
}

#[tokio::test]
async fn fallback_and_budget_alert_in_one_approval() {
    let world = build_world(vec![
        ScriptedAdapter {
            kind: SupplierKind::Buildmax,
            price: Some(Money::from_cents(700)),
            outcome: Placement::Failed {
                error: "login failed".to_string(),
            },
        },
        ScriptedAdapter {
            kind: SupplierKind::Toolhaus,
            price: Some(Money::from_cents(900)),
            outcome: Placement::InCart,
        },
    ]);
    // 100 bags at 8.50 = 850.00 against a 1000.00 budget: crosses 80%.
    let site = add_site(&world, 100_000);
    let request = add_request(&world, &site, 100);

    world
        .orchestrator
        .approve(world.tenant, request.id)
        .await
        .unwrap();

    // The alert fired on the synchronous path, before any ordering.
    let alerts = world.alerts.list(world.tenant, site.id).unwrap();
    let kinds: Vec<_> = alerts.iter().map(|a| a.kind).collect();
    assert!(kinds.contains(&BudgetAlertKind::EightyPercent), "{kinds:?}");
    assert!(kinds.contains(&BudgetAlertKind::LargeOrder), "{kinds:?}");

    world.orchestrator.run_pipeline_once().await.unwrap().unwrap();

    // BuildMax was cheapest but failed; ToolHaus took the order into cart.
    let order = world
        .orders
        .get_by_request(world.tenant, request.id)
        .unwrap()
        .unwrap();
    assert_eq!(order.supplier, SupplierKind::Toolhaus);
    assert_eq!(order.status, OrderStatus::InCart);
    assert!(order.reason.contains("BuildMax"), "{}", order.reason);
    assert!(order.reason.contains("login failed"), "{}", order.reason);
    assert!(order.backend_order_id.is_none());
}

#[tokio::test]
async fn all_suppliers_failing_yields_a_failed_order_and_notification() {
    let world = build_world(vec![
        ScriptedAdapter {
            kind: SupplierKind::Buildmax,
            price: None,
            outcome: Placement::Failed {
                error: "timeout".to_string(),
            },
        },
        ScriptedAdapter {
            kind: SupplierKind::Metrosupply,
            price: None,
            outcome: Placement::Failed {
                error: "item not found".to_string(),
            },
        },
    ]);
    let site = add_site(&world, 100_000);
    let request = add_request(&world, &site, 5);

    world
        .orchestrator
        .approve(world.tenant, request.id)
        .await
        .unwrap();
    world.orchestrator.run_pipeline_once().await.unwrap().unwrap();

    let order = world
        .orders
        .get_by_request(world.tenant, request.id)
        .unwrap()
        .unwrap();
    assert_eq!(order.status, OrderStatus::Failed);
    assert!(order.reason.contains("timeout"), "{}", order.reason);
    assert!(order.reason.contains("item not found"), "{}", order.reason);

    // The approval itself still stands.
    let stored = world
        .requests
        .get(world.tenant, request.id)
        .unwrap()
        .unwrap();
    assert_eq!(stored.status(), RequestStatus::Approved);

    assert!(world
        .notifier
        .sent_to(request.requester)
        .iter()
        .any(|e| matches!(e, NotificationEvent::OrderFailed { .. })));
}
