//! Monetary amounts in the smallest currency unit.

use serde::{Deserialize, Serialize};

/// An amount of money in cents.
///
/// Stored as a signed integer so arithmetic stays exact; budget math never
/// touches floating point. Values are compared by value, not identity.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiply a unit price by a quantity (saturating on overflow).
    pub fn times(&self, quantity: i64) -> Money {
        Money(self.0.saturating_mul(quantity))
    }

    pub fn plus(&self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }

    pub fn minus(&self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0))
    }
}

impl core::fmt::Display for Money {
    /// Renders as a decimal amount, e.g. `1050` cents as `10.50`.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_cents_as_decimal() {
        assert_eq!(Money::from_cents(1000).to_string(), "10.00");
        assert_eq!(Money::from_cents(850).to_string(), "8.50");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-1234).to_string(), "-12.34");
    }

    #[test]
    fn times_scales_unit_price() {
        assert_eq!(Money::from_cents(250).times(4), Money::from_cents(1000));
        assert_eq!(Money::ZERO.times(100), Money::ZERO);
    }
}
