//! Type-safe price representation using decimal arithmetic.
//!
//! The backend prices everything in Indonesian rupiah and sends amounts as
//! plain JSON numbers (`"price": 10000`). [`Price`] keeps the amount as a
//! [`Decimal`] so cart totals never accumulate floating point error, and
//! serializes back to a JSON number for the wire.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A unit or aggregate price in rupiah.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of rupiah.
    #[must_use]
    pub fn from_rupiah(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Format for display the way the storefront shows prices, e.g. `Rp 10.000`.
    ///
    /// Amounts are rounded to whole rupiah and grouped with `.` separators.
    #[must_use]
    pub fn format_idr(&self) -> String {
        let rounded = self.0.round_dp(0).normalize();
        let digits = rounded.abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        if rounded.is_sign_negative() && !rounded.is_zero() {
            format!("-Rp {grouped}")
        } else {
            format!("Rp {grouped}")
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.format_idr())
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

/// Saturates at the `Decimal` bounds instead of panicking on overflow.
impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

/// Saturates at the `Decimal` bounds instead of panicking on overflow.
impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
