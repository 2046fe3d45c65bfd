//! Price representation shared by store-owned and external catalog entries.
//!
//! Store-owned products are priced in whole currency units by the backend,
//! while external catalogs report fractional amounts. Both are normalized to
//! a [`Decimal`] so listings can be compared and summed without float drift.
//! Arithmetic saturates instead of panicking on out-of-range backend values.

use core::fmt;
use core::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount in US dollars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from whole currency units (backend product prices).
    #[must_use]
    pub fn from_units(units: u64) -> Self {
        Self(Decimal::from(units))
    }

    /// Create a price from a float, as reported by external catalogs.
    ///
    /// Non-finite or out-of-range values become zero.
    #[must_use]
    pub fn from_f64_lossy(value: f64) -> Self {
        Decimal::try_from(value).map_or(Self::ZERO, |d| Self(d.round_dp(2)))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by an item quantity, saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn times(self, quantity: u64) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// Round to cents.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self(self.0.round_dp(2))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0.saturating_mul(rhs))
    }
}

impl core::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
