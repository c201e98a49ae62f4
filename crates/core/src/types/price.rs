//! Type-safe price representation using decimal arithmetic.
//!
//! Amounts are Vietnamese dong. The cart service computes every total; the
//! client only sums subtotals for the checkout selection and formats amounts
//! for display.

use core::fmt;
use core::iter::Sum;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount in dong.
///
/// Deserializes from JSON numbers and decimal strings alike.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero dong.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of dong.
    #[must_use]
    pub fn from_dong(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|p| p.0).sum())
    }
}

/// Formats as `1.250.000 ₫`; a non-zero fraction is kept after a comma.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = self.0.normalize();
        let sign = if amount.is_sign_negative() && !amount.is_zero() {
            "-"
        } else {
            ""
        };
        let abs = amount.abs();
        let integer = abs.trunc().normalize();
        let fraction = abs - integer;

        let digits = integer.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        if fraction.is_zero() {
            write!(f, "{sign}{grouped} ₫")
        } else {
            let fraction = fraction.normalize().to_string();
            let decimals = fraction.trim_start_matches('0').trim_start_matches('.');
            write!(f, "{sign}{grouped},{decimals} ₫")
        }
    }
}
