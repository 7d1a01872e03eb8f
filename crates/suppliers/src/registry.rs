//! Mapping from tenant supplier accounts to the adapter pool.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use siteproc_core::{AccountId, TenantId};

use crate::adapter::SupplierAdapter;
use crate::credentials::Credentials;
use crate::kind::SupplierKind;

/// Backend credentials for one (tenant, supplier) pair.
///
/// The set of active accounts, in stored order, defines the adapter pool a
/// tenant's requests are fulfilled from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierAccount {
    pub id: AccountId,
    pub tenant_id: TenantId,
    pub supplier: SupplierKind,
    pub credentials: Credentials,
    pub active: bool,
}

/// One pool slot: the adapter plus the credentials to drive it with.
#[derive(Clone)]
pub struct PoolEntry {
    pub adapter: Arc<dyn SupplierAdapter>,
    pub credentials: Credentials,
}

impl PoolEntry {
    pub fn kind(&self) -> SupplierKind {
        self.adapter.kind()
    }
}

impl core::fmt::Debug for PoolEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PoolEntry")
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}

/// Registry of adapter implementations, one per known backend.
///
/// Tenant configuration is resolved against this registry instead of
/// branching on supplier strings at call sites. An account whose backend has
/// no registered adapter is skipped (and should be surfaced by an admin
/// health check, not by failing a request pipeline).
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<SupplierKind, Arc<dyn SupplierAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the adapter for its backend. Replaces any previous one.
    pub fn with_adapter(mut self, adapter: Arc<dyn SupplierAdapter>) -> Self {
        self.adapters.insert(adapter.kind(), adapter);
        self
    }

    pub fn get(&self, kind: SupplierKind) -> Option<Arc<dyn SupplierAdapter>> {
        self.adapters.get(&kind).cloned()
    }

    /// Build the fulfillment pool for a tenant's accounts.
    ///
    /// Keeps account order, takes only active accounts with a registered
    /// adapter, and deduplicates by backend (first account wins).
    pub fn pool_for(&self, accounts: &[SupplierAccount]) -> Vec<PoolEntry> {
        let mut seen: Vec<SupplierKind> = Vec::new();
        let mut pool = Vec::new();
        for account in accounts.iter().filter(|a| a.active) {
            if seen.contains(&account.supplier) {
                continue;
            }
            if let Some(adapter) = self.get(account.supplier) {
                seen.push(account.supplier);
                pool.push(PoolEntry {
                    adapter,
                    credentials: account.credentials.clone(),
                });
            }
        }
        pool
    }
}
