//! The approval orchestrator: synchronous decision, asynchronous tail.
//!
//! `approve` does everything the approver must see succeed before their call
//! returns: the status transition, the budget ledger, the decision
//! notification. Ordering runs afterwards from the outbox, one pipeline per
//! approved request, executed by a [`PipelineWorker`]. A pipeline failure is
//! recorded on the outbox entry and never rolls the approval back.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use siteproc_core::{DomainError, RequestId, TenantId, UserId};
use siteproc_procurement::{CompanySettings, OrderStatus, Request, RequestStatus, SupplierOrder};
use siteproc_suppliers::{AdapterRegistry, Placement, PlacementRequest};

use crate::dispatcher::{Dispatch, OrderDispatcher};
use crate::error::ProcurementError;
use crate::ledger::BudgetLedger;
use crate::notify::{fan_out, NotificationEvent, Notifier};
use crate::outbox::{PipelineJob, ProcurementOutbox};
use crate::selector::{Selection, SupplierSelector};
use crate::stores::{
    AccountStore, JobSiteStore, OrderStore, RequestStore, SettingsStore, UserDirectory,
};

/// Everything the orchestrator needs, injected as ports.
pub struct OrchestratorDeps {
    pub requests: Arc<dyn RequestStore>,
    pub job_sites: Arc<dyn JobSiteStore>,
    pub orders: Arc<dyn OrderStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub directory: Arc<dyn UserDirectory>,
    pub registry: AdapterRegistry,
    pub selector: SupplierSelector,
    pub notifier: Arc<dyn Notifier>,
    pub outbox: Arc<ProcurementOutbox>,
    pub ledger: BudgetLedger,
}

pub struct ApprovalOrchestrator {
    deps: OrchestratorDeps,
}

impl ApprovalOrchestrator {
    pub fn new(deps: OrchestratorDeps) -> Self {
        Self { deps }
    }

    pub fn outbox(&self) -> &Arc<ProcurementOutbox> {
        &self.deps.outbox
    }

    /// Approve a pending request.
    ///
    /// Returns once the transition is persisted, the ledger has run and the
    /// requester is notified. The supplier pipeline is queued, not executed:
    /// placement can take minutes of backend automation and the approver's
    /// call must not wait for it.
    pub async fn approve(
        &self,
        tenant_id: TenantId,
        request_id: RequestId,
    ) -> Result<Request, ProcurementError> {
        let now = Utc::now();
        let mut request = self.load(tenant_id, request_id)?;
        request.approve(now)?;
        self.deps.requests.update(&request)?;
        info!(%request_id, product = %request.product, "request approved");

        // Nothing past the persisted transition may fail the approver's
        // call: a broken settings store degrades to defaults, a broken
        // ledger is logged and skipped.
        let settings = self.deps.settings.get(tenant_id).unwrap_or_else(|error| {
            warn!(%request_id, %error, "could not load settings; using defaults for the ledger");
            CompanySettings::defaults(tenant_id)
        });
        if let Err(error) = self
            .deps
            .ledger
            .record_approval(&request, &settings, now)
            .await
        {
            warn!(%request_id, %error, "budget ledger update failed; approval stands");
        }

        self.notify_decision(&request, true).await;

        if let Err(error) = self.deps.outbox.enqueue(tenant_id, request_id) {
            error!(%request_id, %error, "could not queue supplier pipeline; approval stands");
        }

        Ok(request)
    }

    /// Reject a pending request. No ledger, no pipeline.
    pub async fn reject(
        &self,
        tenant_id: TenantId,
        request_id: RequestId,
    ) -> Result<Request, ProcurementError> {
        let mut request = self.load(tenant_id, request_id)?;
        request.reject(Utc::now())?;
        self.deps.requests.update(&request)?;
        info!(%request_id, product = %request.product, "request rejected");

        self.notify_decision(&request, false).await;
        Ok(request)
    }

    /// Claim and run one queued pipeline. Returns `None` when the outbox has
    /// nothing pending.
    pub async fn run_pipeline_once(&self) -> Option<Result<(), ProcurementError>> {
        let job = self.deps.outbox.claim_next()?;
        let request_id = job.request_id;

        let outcome = self.run_pipeline(&job).await;
        let transition = match &outcome {
            Ok(()) => self.deps.outbox.complete(request_id),
            Err(error) => {
                error!(%request_id, %error, "supplier pipeline failed; approval unaffected");
                self.deps.outbox.fail(request_id, error.to_string())
            }
        };
        if let Err(error) = transition {
            error!(%request_id, %error, "could not record pipeline outcome");
        }

        Some(outcome)
    }

    async fn run_pipeline(&self, job: &PipelineJob) -> Result<(), ProcurementError> {
        let tenant_id = job.tenant_id;
        let request = self
            .load(tenant_id, job.request_id)?;
        if request.status() != RequestStatus::Approved {
            return Err(DomainError::invariant(format!(
                "pipeline for request {} in status {:?}",
                request.id,
                request.status()
            ))
            .into());
        }

        // One order per request. A re-run after a crash must not order twice.
        if let Some(existing) = self.deps.orders.get_by_request(tenant_id, request.id)? {
            info!(
                request_id = %request.id,
                order_id = %existing.id,
                "order already exists; skipping placement"
            );
            return Ok(());
        }

        let site = self
            .deps
            .job_sites
            .get(tenant_id, request.job_site_id)?
            .ok_or(crate::stores::StoreError::NotFound)?;
        let settings = self.deps.settings.get(tenant_id)?;

        let accounts = self.deps.accounts.list(tenant_id)?;
        let pool = self.deps.registry.pool_for(&accounts);

        let selection = self
            .deps
            .selector
            .select(
                &pool,
                settings.preference,
                &request.product,
                site.address.as_deref(),
                request.preferred_supplier,
            )
            .await;

        let Selection::Selected { index, kind, reason } = selection else {
            let event = NotificationEvent::OrderFailed {
                request_id: request.id,
                product: request.product.clone(),
                quantity: request.quantity,
                unit: request.unit.clone(),
                job_site: site.name.clone(),
                reason: "no supplier account configured".to_string(),
            };
            self.notify_order_watchers(&request, &event).await;
            return Err(ProcurementError::NoSupplierConfigured);
        };

        info!(request_id = %request.id, supplier = %kind, %reason, "supplier selected");

        let placement_request = PlacementRequest {
            product: request.product.clone(),
            quantity: request.quantity,
            unit: request.unit.clone(),
            delivery_address: settings.delivery.delivery_address().map(str::to_string),
            payment: settings.payment.clone(),
        };

        let dispatch =
            OrderDispatcher::dispatch(&pool, index, &reason, &placement_request).await;
        let now = Utc::now();

        let (order, event) = match dispatch {
            Dispatch::Accepted { supplier, placement, reason } => match placement {
                Placement::Confirmed { backend_order_id } => {
                    let order = SupplierOrder::new(
                        tenant_id,
                        request.id,
                        request.job_site_id,
                        supplier,
                        OrderStatus::Confirmed,
                        Some(backend_order_id.clone()),
                        reason.clone(),
                        now,
                    );
                    let event = NotificationEvent::OrderConfirmed {
                        request_id: request.id,
                        product: request.product.clone(),
                        quantity: request.quantity,
                        unit: request.unit.clone(),
                        job_site: site.name.clone(),
                        supplier,
                        reason,
                        backend_order_id,
                        cancel_token: order.cancellation.token(),
                        cancel_expires_at: order.cancellation.expires_at(),
                    };
                    (order, event)
                }
                Placement::InCart => {
                    let order = SupplierOrder::new(
                        tenant_id,
                        request.id,
                        request.job_site_id,
                        supplier,
                        OrderStatus::InCart,
                        None,
                        reason.clone(),
                        now,
                    );
                    let event = NotificationEvent::OrderInCart {
                        request_id: request.id,
                        product: request.product.clone(),
                        quantity: request.quantity,
                        unit: request.unit.clone(),
                        job_site: site.name.clone(),
                        supplier,
                        reason,
                    };
                    (order, event)
                }
                Placement::Failed { .. } => {
                    // `dispatch` never returns Accepted with a failed
                    // placement.
                    return Err(DomainError::invariant(
                        "dispatcher accepted a failed placement",
                    )
                    .into());
                }
            },
            Dispatch::AllFailed { attempts } => {
                let reason = Dispatch::all_failed_reason(&attempts);
                let order = SupplierOrder::new(
                    tenant_id,
                    request.id,
                    request.job_site_id,
                    kind,
                    OrderStatus::Failed,
                    None,
                    reason.clone(),
                    now,
                );
                let event = NotificationEvent::OrderFailed {
                    request_id: request.id,
                    product: request.product.clone(),
                    quantity: request.quantity,
                    unit: request.unit.clone(),
                    job_site: site.name.clone(),
                    reason,
                };
                (order, event)
            }
        };

        self.deps.orders.insert(order)?;
        self.notify_order_watchers(&request, &event).await;
        Ok(())
    }

    fn load(&self, tenant_id: TenantId, request_id: RequestId) -> Result<Request, ProcurementError> {
        self.deps
            .requests
            .get(tenant_id, request_id)?
            .ok_or(ProcurementError::Domain(DomainError::NotFound))
    }

    async fn notify_decision(&self, request: &Request, approved: bool) {
        let event = NotificationEvent::RequestDecision {
            request_id: request.id,
            product: request.product.clone(),
            approved,
        };
        fan_out(self.deps.notifier.as_ref(), &[request.requester], &event).await;
    }

    /// Requester plus the tenant's office and admin users, each at most once.
    async fn notify_order_watchers(&self, request: &Request, event: &NotificationEvent) {
        let mut recipients: Vec<UserId> = match self
            .deps
            .directory
            .office_and_admin_users(request.tenant_id)
        {
            Ok(users) => users,
            Err(error) => {
                warn!(%error, "could not resolve order watchers; notifying requester only");
                Vec::new()
            }
        };
        if !recipients.contains(&request.requester) {
            recipients.push(request.requester);
        }
        fan_out(self.deps.notifier.as_ref(), &recipients, event).await;
    }
}

/// Background worker draining the outbox.
pub struct PipelineWorker {
    orchestrator: Arc<ApprovalOrchestrator>,
    poll_interval: Duration,
}

/// Handle to a running worker; dropping it does not stop the worker, `stop`
/// does.
pub struct WorkerHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    /// Signal shutdown and wait for the in-flight pipeline to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(error) = self.join.await {
            error!(%error, "pipeline worker task panicked");
        }
    }
}

impl PipelineWorker {
    pub fn new(orchestrator: Arc<ApprovalOrchestrator>) -> Self {
        Self {
            orchestrator,
            poll_interval: Duration::from_millis(250),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Spawn the drain loop. Runs pipelines one at a time; between jobs it
    /// sleeps for the poll interval or until shutdown.
    pub fn spawn(self) -> WorkerHandle {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(async move {
            loop {
                // Drain everything pending before sleeping.
                while self.orchestrator.run_pipeline_once().await.is_some() {
                    if *shutdown_rx.borrow() {
                        return;
                    }
                }
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            return;
                        }
                    }
                    _ = tokio::time::sleep(self.poll_interval) => {}
                }
            }
        });
        WorkerHandle { shutdown, join }
    }
}
