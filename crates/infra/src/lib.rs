//! `siteproc-infra` — the procurement engine.
//!
//! Everything that moves the domain model: storage ports with in-memory
//! implementations, supplier selection and dispatch, the budget ledger,
//! notification fan-out, the pipeline outbox, and the approval orchestrator
//! that ties the synchronous path and the async tail together.

pub mod dispatcher;
pub mod error;
pub mod health;
pub mod ledger;
pub mod notify;
pub mod orchestrator;
pub mod outbox;
pub mod selector;
pub mod stores;

pub use dispatcher::{Attempt, Dispatch, OrderDispatcher};
pub use error::ProcurementError;
pub use health::{check_accounts, AccountHealth};
pub use ledger::BudgetLedger;
pub use notify::{fan_out, InMemoryNotifier, NotificationEvent, Notifier, NotifyError};
pub use orchestrator::{ApprovalOrchestrator, OrchestratorDeps, PipelineWorker, WorkerHandle};
pub use outbox::{OutboxError, PipelineJob, PipelineStatus, ProcurementOutbox};
pub use selector::{Selection, SupplierSelector};
