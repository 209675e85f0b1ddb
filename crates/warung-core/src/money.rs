//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In JavaScript/floating point:                                      │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  OUR SOLUTION: integers in the smallest currency unit               │
//! │    Rp15.000 is the i64 value 15000 - exact, always                  │
//! │                                                                     │
//! │  The database, calculations, and API all use integer units.         │
//! │  Only the UI formats for display.                                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use warung_core::money::Money;
//!
//! let price = Money::from_units(15_000);
//! let line_total = price * 3;
//! assert_eq!(line_total.units(), 45_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (whole rupiah).
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate results (change before the shortage
///   check) may be negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from smallest currency units.
    ///
    /// ## Example
    /// ```rust
    /// use warung_core::money::Money;
    ///
    /// let price = Money::from_units(10_000);
    /// assert_eq!(price.units(), 10_000);
    /// ```
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    /// Returns the value in smallest currency units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use warung_core::money::Money;
    ///
    /// let unit_price = Money::from_units(5_000);
    /// let line_subtotal = unit_price.multiply_quantity(3);
    /// assert_eq!(line_subtotal.units(), 15_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Clamps the value into `[min, max]`.
    ///
    /// Used by checkout to resolve a caller-supplied discount: negative
    /// discounts collapse to zero, discounts above the subtotal collapse to
    /// the subtotal, so the resulting total can never go below zero.
    ///
    /// ## Example
    /// ```rust
    /// use warung_core::money::Money;
    ///
    /// let subtotal = Money::from_units(15_000);
    /// let discount = Money::from_units(20_000).clamp(Money::zero(), subtotal);
    /// assert_eq!(discount, subtotal);
    /// ```
    #[inline]
    pub fn clamp(self, min: Money, max: Money) -> Money {
        Money(self.0.clamp(min.0, max.0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable rupiah format
/// with dot thousand separators (`Rp15.000`).
///
/// ## Note
/// This is for logs and receipts in tests. Use frontend formatting for
/// actual UI display to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}Rp{}", sign, group_thousands(self.0.unsigned_abs()))
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Inserts a `.` every three digits, Indonesian style.
fn group_thousands(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut groups = Vec::new();
    while value > 0 {
        groups.push((value % 1000, value >= 1000));
        value /= 1000;
    }

    groups
        .iter()
        .rev()
        .map(|(g, padded)| {
            if *padded {
                format!("{:03}", g)
            } else {
                g.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_units() {
        let money = Money::from_units(10_000);
        assert_eq!(money.units(), 10_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_units(15_000)), "Rp15.000");
        assert_eq!(format!("{}", Money::from_units(1_250_500)), "Rp1.250.500");
        assert_eq!(format!("{}", Money::from_units(500)), "Rp500");
        assert_eq!(format!("{}", Money::from_units(0)), "Rp0");
        assert_eq!(format!("{}", Money::from_units(-2_000)), "-Rp2.000");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_units(10_000);
        let b = Money::from_units(4_000);

        assert_eq!((a + b).units(), 14_000);
        assert_eq!((a - b).units(), 6_000);
        assert_eq!((a * 3).units(), 30_000);

        let mut acc = Money::zero();
        acc += a;
        acc -= b;
        assert_eq!(acc.units(), 6_000);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_units(5_000);
        assert_eq!(unit_price.multiply_quantity(3).units(), 15_000);
    }

    #[test]
    fn test_clamp_discount_semantics() {
        let subtotal = Money::from_units(15_000);

        // Negative discounts collapse to zero
        let neg = Money::from_units(-500).clamp(Money::zero(), subtotal);
        assert_eq!(neg, Money::zero());

        // Oversized discounts collapse to the subtotal
        let over = Money::from_units(99_999).clamp(Money::zero(), subtotal);
        assert_eq!(over, subtotal);

        // In-range discounts pass through
        let ok = Money::from_units(1_000).clamp(Money::zero(), subtotal);
        assert_eq!(ok.units(), 1_000);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_units(100);
        assert!(positive.is_positive());

        let negative = Money::from_units(-100);
        assert!(negative.is_negative());
    }
}
