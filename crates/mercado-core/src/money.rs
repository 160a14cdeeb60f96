//! # Money Module
//!
//! Provides the `Money` type for handling monetary values exactly.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Sale lines arrive as decimals (unit price 19.90, discount 7.96).       │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal                                             │
//! │    19.90 × 4 × 10% = 7.960 exactly                                     │
//! │    Rounding only happens when explicitly requested                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mercado_core::money::Money;
//!
//! let price = Money::from_cents(1990); // 19.90
//! let subtotal = price.multiply_quantity(4); // 79.60
//! assert_eq!(subtotal.percentage(1000), Some(Money::from_cents(796))); // 10%
//! ```

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

// =============================================================================
// Money Type
// =============================================================================

/// An exact monetary amount in the store currency.
///
/// ## Where Money is Used
/// ```text
/// SaleItem.unit_price ──► × quantity ──► subtotal ──► − discount ──► total
///                                                                     │
/// Sale.total_amount ◄──────────── Σ active item totals ◄──────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a value from the smallest currency unit.
    ///
    /// ```rust
    /// use mercado_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).to_string(), "10.99");
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Line subtotal: unit price × quantity.
    ///
    /// Panics on overflow like the `Decimal` operators. Only call it on lines
    /// that were already priced; use [`Money::checked_multiply_quantity`]
    /// for raw input.
    #[inline]
    pub fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0 * Decimal::from(qty))
    }

    /// `None` when the product does not fit in a `Decimal`.
    #[inline]
    pub fn checked_multiply_quantity(&self, qty: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(qty)).map(Money)
    }

    /// Percentage of this amount, given in basis points (1000 bps = 10%).
    ///
    /// Exact; no rounding is applied. `None` on overflow.
    ///
    /// ```rust
    /// use mercado_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(50000); // 500.00
    /// assert_eq!(subtotal.percentage(2000), Some(Money::from_cents(10000))); // 20%
    /// ```
    pub fn percentage(&self, bps: u32) -> Option<Self> {
        self.0
            .checked_mul(Decimal::from(bps))
            .and_then(|scaled| scaled.checked_div(Decimal::from(10_000u32)))
            .map(Money)
    }

    /// Rounds to two decimal places using Bankers Rounding.
    ///
    /// Only for presentation; stored amounts keep full precision.
    pub fn round_to_cents(&self) -> Self {
        Money(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven),
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

// =============================================================================
// Arithmetic
// =============================================================================

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
