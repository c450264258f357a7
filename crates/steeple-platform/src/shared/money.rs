//! Monetary amounts
//!
//! Amounts are kept as an integer count of cents. The store holds them as
//! Int64 so `$inc` on a running total stays exact; the HTTP layer speaks
//! decimals and converts at the boundary with [`Money::from_decimal`].

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;

use crate::shared::error::{PlatformError, Result};

const MINOR_UNIT_SCALE: u32 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Parse a strictly positive amount with at most two decimal places.
    pub fn from_decimal(amount: Decimal) -> Result<Self> {
        if amount <= Decimal::ZERO {
            return Err(PlatformError::validation("Amount must be greater than zero"));
        }

        let normalized = amount.normalize();
        if normalized.scale() > MINOR_UNIT_SCALE {
            return Err(PlatformError::validation(
                "Amount must have at most two decimal places",
            ));
        }

        normalized
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(Self)
            .ok_or_else(|| PlatformError::validation("Amount is too large"))
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, MINOR_UNIT_SCALE)
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Money::saturating_add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl From<Money> for bson::Bson {
    fn from(money: Money) -> Self {
        bson::Bson::Int64(money.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_accepts_cents() {
        assert_eq!(Money::from_decimal(dec("250")).unwrap().cents(), 25_000);
        assert_eq!(Money::from_decimal(dec("0.01")).unwrap().cents(), 1);
        assert_eq!(Money::from_decimal(dec("19.90")).unwrap().cents(), 1_990);
        // trailing zeros beyond two places are not extra precision
        assert_eq!(Money::from_decimal(dec("5.1000")).unwrap().cents(), 510);
    }

    #[test]
    fn test_rejects_non_positive() {
        assert!(Money::from_decimal(Decimal::ZERO).is_err());
        assert!(Money::from_decimal(dec("-10")).is_err());
    }

    #[test]
    fn test_rejects_sub_cent_precision() {
        let err = Money::from_decimal(dec("1.005")).unwrap_err();
        assert!(matches!(err, PlatformError::Validation { .. }));
    }

    #[test]
    fn test_rejects_overflow() {
        assert!(Money::from_decimal(Decimal::MAX).is_err());
    }

    #[test]
    fn test_to_decimal_and_sum() {
        let total: Money = [Money::from_cents(25_000), Money::from_cents(10_000), Money::from_cents(5_000)]
            .into_iter()
            .sum();
        assert_eq!(total.to_decimal(), dec("400.00"));
        assert_eq!(total.to_string(), "400.00");
    }

    #[test]
    fn test_bson_representation() {
        #[derive(Serialize)]
        struct Row {
            amount: Money,
        }

        let doc = bson::to_document(&Row { amount: Money::from_cents(5_000) }).unwrap();
        assert_eq!(doc.get("amount"), Some(&bson::Bson::Int64(5_000)));
    }
}
