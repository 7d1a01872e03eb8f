//! Opaque secret handles passed through to backend adapters.

use serde::{Deserialize, Serialize};

/// Backend login credentials for one supplier account.
///
/// The engine never parses this; it is decrypted upstream and handed to the
/// adapter as-is. `Debug` and `Display` redact the value so it cannot leak
/// into logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(String);

impl Credentials {
    pub fn new(blob: impl Into<String>) -> Self {
        Self(blob.into())
    }

    /// Hand the raw blob to an adapter. Do not log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Credentials([redacted])")
    }
}

impl core::fmt::Display for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("[redacted]")
    }
}

/// Opaque payment data forwarded to an adapter at checkout.
///
/// Same handling rules as [`Credentials`]: pass through, never parse, never
/// log.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentBlob(String);

impl PaymentBlob {
    pub fn new(blob: impl Into<String>) -> Self {
        Self(blob.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for PaymentBlob {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PaymentBlob([redacted])")
    }
}
