//! Connectivity health of a tenant's supplier accounts.
//!
//! Dead credentials should surface in an admin view, not as a failed attempt
//! deep inside a request pipeline. Checks run concurrently; an account whose
//! backend has no registered adapter is reported as such instead of being
//! silently dropped.

use futures_util::future::join_all;
use tracing::warn;

use siteproc_core::AccountId;
use siteproc_suppliers::{AdapterRegistry, ConnectionStatus, SupplierAccount, SupplierKind};

/// Health of one supplier account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountHealth {
    pub account_id: AccountId,
    pub supplier: SupplierKind,
    pub status: ConnectionStatus,
}

/// Test every active account's backend login.
pub async fn check_accounts(
    registry: &AdapterRegistry,
    accounts: &[SupplierAccount],
) -> Vec<AccountHealth> {
    let checks = accounts.iter().filter(|a| a.active).map(|account| async {
        let status = match registry.get(account.supplier) {
            Some(adapter) => adapter.test_connection(&account.credentials).await,
            None => ConnectionStatus::Failed {
                error: "no adapter registered for this backend".to_string(),
            },
        };
        if let ConnectionStatus::Failed { error } = &status {
            warn!(supplier = %account.supplier, %error, "supplier account unhealthy");
        }
        AccountHealth {
            account_id: account.id,
            supplier: account.supplier,
            status,
        }
    });
    join_all(checks).await
}
