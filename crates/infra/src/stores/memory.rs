//! In-memory store implementations for tests and single-process use.

use std::collections::HashMap;
use std::sync::RwLock;

use siteproc_catalog::CatalogEntry;
use siteproc_core::{JobSiteId, Money, RequestId, TenantId, UserId};
use siteproc_procurement::{
    BudgetAlert, BudgetCommit, CompanySettings, JobSite, Request, SupplierOrder,
};
use siteproc_suppliers::SupplierAccount;

use super::{
    AccountStore, AlertStore, CatalogStore, JobSiteStore, OrderStore, RequestStore, SettingsStore,
    StoreError, UserDirectory,
};

#[derive(Debug, Default)]
pub struct InMemoryRequestStore {
    requests: RwLock<HashMap<RequestId, Request>>,
}

impl InMemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestStore for InMemoryRequestStore {
    fn insert(&self, request: Request) -> Result<(), StoreError> {
        let mut requests = self.requests.write().unwrap();
        if requests.contains_key(&request.id) {
            return Err(StoreError::AlreadyExists(request.id.to_string()));
        }
        requests.insert(request.id, request);
        Ok(())
    }

    fn get(&self, tenant_id: TenantId, id: RequestId) -> Result<Option<Request>, StoreError> {
        let requests = self.requests.read().unwrap();
        match requests.get(&id) {
            Some(r) if r.tenant_id == tenant_id => Ok(Some(r.clone())),
            Some(_) => Err(StoreError::TenantIsolation),
            None => Ok(None),
        }
    }

    fn update(&self, request: &Request) -> Result<(), StoreError> {
        let mut requests = self.requests.write().unwrap();
        if !requests.contains_key(&request.id) {
            return Err(StoreError::NotFound);
        }
        requests.insert(request.id, request.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryJobSiteStore {
    sites: RwLock<HashMap<JobSiteId, JobSite>>,
}

impl InMemoryJobSiteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobSiteStore for InMemoryJobSiteStore {
    fn insert(&self, site: JobSite) -> Result<(), StoreError> {
        let mut sites = self.sites.write().unwrap();
        if sites.contains_key(&site.id) {
            return Err(StoreError::AlreadyExists(site.id.to_string()));
        }
        sites.insert(site.id, site);
        Ok(())
    }

    fn get(&self, tenant_id: TenantId, id: JobSiteId) -> Result<Option<JobSite>, StoreError> {
        let sites = self.sites.read().unwrap();
        match sites.get(&id) {
            Some(s) if s.tenant_id == tenant_id => Ok(Some(s.clone())),
            Some(_) => Err(StoreError::TenantIsolation),
            None => Ok(None),
        }
    }

    fn commit_spend(
        &self,
        tenant_id: TenantId,
        id: JobSiteId,
        amount: Money,
    ) -> Result<BudgetCommit, StoreError> {
        // The write lock is the serialization point: increment and snapshot
        // happen in one critical section.
        let mut sites = self.sites.write().unwrap();
        let site = sites.get_mut(&id).ok_or(StoreError::NotFound)?;
        if site.tenant_id != tenant_id {
            return Err(StoreError::TenantIsolation);
        }
        Ok(site.commit(amount))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    by_request: RwLock<HashMap<RequestId, SupplierOrder>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderStore for InMemoryOrderStore {
    fn insert(&self, order: SupplierOrder) -> Result<(), StoreError> {
        let mut orders = self.by_request.write().unwrap();
        if orders.contains_key(&order.request_id) {
            return Err(StoreError::AlreadyExists(order.request_id.to_string()));
        }
        orders.insert(order.request_id, order);
        Ok(())
    }

    fn get_by_request(
        &self,
        tenant_id: TenantId,
        request_id: RequestId,
    ) -> Result<Option<SupplierOrder>, StoreError> {
        let orders = self.by_request.read().unwrap();
        match orders.get(&request_id) {
            Some(o) if o.tenant_id == tenant_id => Ok(Some(o.clone())),
            Some(_) => Err(StoreError::TenantIsolation),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAlertStore {
    alerts: RwLock<Vec<BudgetAlert>>,
}

impl InMemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlertStore for InMemoryAlertStore {
    fn insert(&self, alert: BudgetAlert) -> Result<(), StoreError> {
        self.alerts.write().unwrap().push(alert);
        Ok(())
    }

    fn list(
        &self,
        tenant_id: TenantId,
        job_site_id: JobSiteId,
    ) -> Result<Vec<BudgetAlert>, StoreError> {
        Ok(self
            .alerts
            .read()
            .unwrap()
            .iter()
            .filter(|a| a.tenant_id == tenant_id && a.job_site_id == job_site_id)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    // Vec keeps account order; pool order is configuration order.
    accounts: RwLock<Vec<SupplierAccount>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn insert(&self, account: SupplierAccount) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().unwrap();
        if accounts.iter().any(|a| a.id == account.id) {
            return Err(StoreError::AlreadyExists(account.id.to_string()));
        }
        accounts.push(account);
        Ok(())
    }

    fn list(&self, tenant_id: TenantId) -> Result<Vec<SupplierAccount>, StoreError> {
        Ok(self
            .accounts
            .read()
            .unwrap()
            .iter()
            .filter(|a| a.tenant_id == tenant_id)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    settings: RwLock<HashMap<TenantId, CompanySettings>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn put(&self, settings: CompanySettings) -> Result<(), StoreError> {
        self.settings
            .write()
            .unwrap()
            .insert(settings.tenant_id, settings);
        Ok(())
    }

    fn get(&self, tenant_id: TenantId) -> Result<CompanySettings, StoreError> {
        Ok(self
            .settings
            .read()
            .unwrap()
            .get(&tenant_id)
            .cloned()
            .unwrap_or_else(|| CompanySettings::defaults(tenant_id)))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    entries: RwLock<Vec<CatalogEntry>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn insert(&self, entry: CatalogEntry) -> Result<(), StoreError> {
        self.entries.write().unwrap().push(entry);
        Ok(())
    }

    fn entries(&self, tenant_id: TenantId) -> Result<Vec<CatalogEntry>, StoreError> {
        Ok(self
            .entries
            .read()
            .unwrap()
            .iter()
            .filter(|e| e.tenant_id == tenant_id)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<TenantId, Vec<UserId>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_office_user(&self, tenant_id: TenantId, user: UserId) {
        self.users.write().unwrap().entry(tenant_id).or_default().push(user);
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn office_and_admin_users(&self, tenant_id: TenantId) -> Result<Vec<UserId>, StoreError> {
        Ok(self
            .users
            .read()
            .unwrap()
            .get(&tenant_id)
            .cloned()
            .unwrap_or_default())
    }
}
