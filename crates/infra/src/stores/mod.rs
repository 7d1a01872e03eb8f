//! Storage ports consumed by the engine.
//!
//! Traits here, implementations per backend; `memory` ships the in-memory
//! variants used by tests and single-process deployments.

pub mod memory;

use siteproc_catalog::CatalogEntry;
use siteproc_core::{JobSiteId, Money, RequestId, TenantId, UserId};
use siteproc_procurement::{BudgetAlert, BudgetCommit, CompanySettings, JobSite, Request, SupplierOrder};
use siteproc_suppliers::SupplierAccount;

pub use memory::{
    InMemoryAccountStore, InMemoryAlertStore, InMemoryCatalogStore, InMemoryJobSiteStore,
    InMemoryOrderStore, InMemoryRequestStore, InMemorySettingsStore, InMemoryUserDirectory,
};

/// Storage-layer error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("tenant isolation violation")]
    TenantIsolation,
    #[error("storage error: {0}")]
    Storage(String),
}

pub trait RequestStore: Send + Sync {
    fn insert(&self, request: Request) -> Result<(), StoreError>;
    fn get(&self, tenant_id: TenantId, id: RequestId) -> Result<Option<Request>, StoreError>;
    fn update(&self, request: &Request) -> Result<(), StoreError>;
}

pub trait JobSiteStore: Send + Sync {
    fn insert(&self, site: JobSite) -> Result<(), StoreError>;
    fn get(&self, tenant_id: TenantId, id: JobSiteId) -> Result<Option<JobSite>, StoreError>;

    /// Serialized read-modify-write on `budget_committed`.
    ///
    /// The increment and the before/after snapshot the crossing check runs
    /// against happen under one lock per store; two concurrent approvals on
    /// the same site cannot both observe a pre-increment percentage.
    fn commit_spend(
        &self,
        tenant_id: TenantId,
        id: JobSiteId,
        amount: Money,
    ) -> Result<BudgetCommit, StoreError>;
}

pub trait OrderStore: Send + Sync {
    /// Insert the unique order for its request. A second insert for the
    /// same request is `AlreadyExists`.
    fn insert(&self, order: SupplierOrder) -> Result<(), StoreError>;
    fn get_by_request(
        &self,
        tenant_id: TenantId,
        request_id: RequestId,
    ) -> Result<Option<SupplierOrder>, StoreError>;
}

pub trait AlertStore: Send + Sync {
    fn insert(&self, alert: BudgetAlert) -> Result<(), StoreError>;
    fn list(&self, tenant_id: TenantId, job_site_id: JobSiteId)
        -> Result<Vec<BudgetAlert>, StoreError>;
}

pub trait AccountStore: Send + Sync {
    fn insert(&self, account: SupplierAccount) -> Result<(), StoreError>;
    /// Accounts in stored order; the active subset defines the pool.
    fn list(&self, tenant_id: TenantId) -> Result<Vec<SupplierAccount>, StoreError>;
}

pub trait SettingsStore: Send + Sync {
    fn put(&self, settings: CompanySettings) -> Result<(), StoreError>;
    /// Tenant settings, falling back to `CompanySettings::defaults`.
    fn get(&self, tenant_id: TenantId) -> Result<CompanySettings, StoreError>;
}

pub trait CatalogStore: Send + Sync {
    fn insert(&self, entry: CatalogEntry) -> Result<(), StoreError>;
    fn entries(&self, tenant_id: TenantId) -> Result<Vec<CatalogEntry>, StoreError>;
}

/// Who receives tenant-wide budget and order notifications.
pub trait UserDirectory: Send + Sync {
    fn office_and_admin_users(&self, tenant_id: TenantId) -> Result<Vec<UserId>, StoreError>;
}
