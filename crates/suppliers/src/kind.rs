//! The closed set of supported retail backends.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use siteproc_core::DomainError;

/// One of the supported retail/wholesale backends.
///
/// This is a closed union: adding a backend means adding a variant here and
/// an adapter implementation, not scattering string comparisons. Tenant
/// configuration refers to these by their stable lowercase key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplierKind {
    /// BuildMax building-materials chain.
    Buildmax,
    /// ToolHaus trade wholesaler.
    Toolhaus,
    /// MetroSupply contractor depot.
    Metrosupply,
}

impl SupplierKind {
    /// All known backends, in a stable order.
    pub const ALL: [SupplierKind; 3] = [
        SupplierKind::Buildmax,
        SupplierKind::Toolhaus,
        SupplierKind::Metrosupply,
    ];

    /// Stable configuration key.
    pub fn key(&self) -> &'static str {
        match self {
            SupplierKind::Buildmax => "buildmax",
            SupplierKind::Toolhaus => "toolhaus",
            SupplierKind::Metrosupply => "metrosupply",
        }
    }

    /// Human-readable name for notifications and selection reasons.
    pub fn display_name(&self) -> &'static str {
        match self {
            SupplierKind::Buildmax => "BuildMax",
            SupplierKind::Toolhaus => "ToolHaus",
            SupplierKind::Metrosupply => "MetroSupply",
        }
    }
}

impl core::fmt::Display for SupplierKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for SupplierKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.key() == s.trim().to_lowercase())
            .ok_or_else(|| DomainError::validation(format!("unknown supplier: {s}")))
    }
}
