//! Time-boxed, single-use cancellation of automatically placed orders.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Minutes an automatically placed order stays reversible.
pub const CANCELLATION_WINDOW_MINUTES: i64 = 120;

/// Unguessable single-use token authorizing a cancellation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CancelToken(Uuid);

impl CancelToken {
    /// Mint a fresh random token (UUIDv4, not time-ordered: the token must
    /// not be guessable from the order's creation time).
    pub fn mint() -> Self {
        Self(Uuid::new_v4())
    }
}

impl core::fmt::Display for CancelToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CancellationError {
    #[error("cancel token does not match this order")]
    WrongToken,
    #[error("cancellation window expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },
    #[error("cancel token already redeemed")]
    AlreadyRedeemed,
}

/// The 2-hour reversal window minted once per supplier order.
///
/// Contract: the token is accepted strictly before expiry, rejected after,
/// never reusable, and never regenerated for the same order. The actual
/// reversal side effect lives with the adapter layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationWindow {
    token: CancelToken,
    expires_at: DateTime<Utc>,
    redeemed: bool,
}

impl CancellationWindow {
    /// Mint the window for an order created at `now`.
    pub fn mint(now: DateTime<Utc>) -> Self {
        Self {
            token: CancelToken::mint(),
            expires_at: now + Duration::minutes(CANCELLATION_WINDOW_MINUTES),
            redeemed: false,
        }
    }

    pub fn token(&self) -> CancelToken {
        self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether `presented` would be accepted at `now` (no state change).
    pub fn accepts(&self, presented: CancelToken, now: DateTime<Utc>) -> bool {
        !self.redeemed && presented == self.token && now < self.expires_at
    }

    /// Consume the token. At most one redemption ever succeeds.
    pub fn redeem(
        &mut self,
        presented: CancelToken,
        now: DateTime<Utc>,
    ) -> Result<(), CancellationError> {
        if presented != self.token {
            return Err(CancellationError::WrongToken);
        }
        if self.redeemed {
            return Err(CancellationError::AlreadyRedeemed);
        }
        if now >= self.expires_at {
            return Err(CancellationError::Expired {
                expired_at: self.expires_at,
            });
        }
        self.redeemed = true;
        Ok(())
    }
}
