//! # Checkout Pricing
//!
//! The pure half of the settlement engine: everything about a checkout
//! that can be computed without touching storage.
//!
//! ## Division of Labor
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Checkout Responsibilities                       │
//! │                                                                     │
//! │  warung-core (THIS MODULE)          warung-db (settlement engine)   │
//! │  ─────────────────────────          ──────────────────────────────  │
//! │  • availability check               • resolve products by id        │
//! │  • line-item freezing               • conditional stock decrement   │
//! │  • subtotal / discount clamp        • append transaction record     │
//! │  • total / change / shortage        • commit or roll back           │
//! │                                                                     │
//! │  Same input → same output. No I/O, no clock, no ids.                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Pricing Rules
//! - `subtotal = Σ (unit_price × quantity)` over frozen line items
//! - `discount` is an absolute amount, clamped into `[0, subtotal]`.
//!   Percentage-to-amount conversion is a caller concern and never
//!   reaches this crate.
//! - `total = subtotal - discount` (never negative, by the clamp)
//! - `change = amount_paid - total`; a negative change is the
//!   [`InsufficientPayment`](CoreError::InsufficientPayment) rejection

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PaymentMethod, Product, TransactionItem};

// =============================================================================
// Checkout Request
// =============================================================================

/// A (productId, quantity) pair submitted for checkout, prior to price
/// resolution.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
}

/// A full checkout submission.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CheckoutRequest {
    /// Ordered cart lines. Must be non-empty.
    pub items: Vec<CartLine>,

    /// What the customer handed over.
    pub amount_paid: i64,

    /// Absolute discount amount. Defaults to zero.
    #[serde(default)]
    pub discount: i64,

    /// Defaults to cash.
    #[serde(default)]
    pub payment_method: PaymentMethod,

    /// Free-text note for the receipt.
    #[serde(default)]
    pub note: String,
}

// =============================================================================
// Availability
// =============================================================================

/// Checks one resolved cart line against current stock.
///
/// Called for every line before any mutation - checkout is all-or-nothing,
/// so a failure on line 3 must surface before lines 1–2 touch anything.
pub fn check_availability(product: &Product, requested: i64) -> CoreResult<()> {
    if product.can_fulfill(requested) {
        Ok(())
    } else {
        Err(CoreError::InsufficientStock {
            product_id: product.id.clone(),
            name: product.name.clone(),
            available: product.stock,
            requested,
        })
    }
}

// =============================================================================
// Settlement Breakdown
// =============================================================================

/// The money outcome of a priced cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementBreakdown {
    pub subtotal: Money,
    /// Discount after clamping into `[0, subtotal]`.
    pub discount: Money,
    pub total: Money,
    pub change: Money,
}

/// Prices a set of frozen line items against a payment.
///
/// ## Errors
/// [`CoreError::InsufficientPayment`] when `amount_paid` does not cover
/// the discounted total. Nothing else can fail: the discount is clamped,
/// not rejected.
///
/// ## Example
/// ```rust
/// use warung_core::checkout::settle;
/// use warung_core::types::TransactionItem;
///
/// let items = vec![TransactionItem {
///     product_id: Some("p2".into()),
///     name: "Kopi Sachet".into(),
///     unit_price: 5_000,
///     quantity: 3,
///     subtotal: 15_000,
/// }];
///
/// let breakdown = settle(&items, 1_000, 20_000).unwrap();
/// assert_eq!(breakdown.total.units(), 14_000);
/// assert_eq!(breakdown.change.units(), 6_000);
/// ```
pub fn settle(
    items: &[TransactionItem],
    discount: i64,
    amount_paid: i64,
) -> CoreResult<SettlementBreakdown> {
    let subtotal = items
        .iter()
        .fold(Money::zero(), |acc, item| acc + item.subtotal());

    let discount = Money::from_units(discount).clamp(Money::zero(), subtotal);
    let total = subtotal - discount;
    let change = Money::from_units(amount_paid) - total;

    if change.is_negative() {
        return Err(CoreError::InsufficientPayment {
            total: total.units(),
            amount_paid,
        });
    }

    Ok(SettlementBreakdown {
        subtotal,
        discount,
        total,
        change,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewProduct;

    fn product(name: &str, price: i64, stock: i64) -> Product {
        Product::new(NewProduct {
            name: name.to_string(),
            category: "Umum".to_string(),
            price,
            stock,
        })
    }

    fn frozen(product: &Product, qty: i64) -> TransactionItem {
        TransactionItem::snapshot(product, qty)
    }

    #[test]
    fn test_check_availability() {
        let p = product("Teh Botol", 4_000, 2);
        assert!(check_availability(&p, 2).is_ok());

        let err = check_availability(&p, 3).unwrap_err();
        match err {
            CoreError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_settle_exact_payment() {
        // Price 10_000, stock 2, buy 2, pay 20_000: total 20_000, change 0
        let p = product("P1", 10_000, 2);
        let items = vec![frozen(&p, 2)];

        let b = settle(&items, 0, 20_000).unwrap();
        assert_eq!(b.subtotal.units(), 20_000);
        assert_eq!(b.discount.units(), 0);
        assert_eq!(b.total.units(), 20_000);
        assert_eq!(b.change.units(), 0);
    }

    #[test]
    fn test_settle_discount_reduces_total() {
        // 3 × 5_000 = 15_000, discount 1_000 → total 14_000
        let p = product("P2", 5_000, 10);
        let items = vec![frozen(&p, 3)];

        let b = settle(&items, 1_000, 14_000).unwrap();
        assert_eq!(b.subtotal.units(), 15_000);
        assert_eq!(b.total.units(), 14_000);
        assert_eq!(b.change.units(), 0);
    }

    #[test]
    fn test_settle_insufficient_payment() {
        // Total 14_000, paid 10_000 → rejected, with the amounts attached
        let p = product("P2", 5_000, 10);
        let items = vec![frozen(&p, 3)];

        let err = settle(&items, 1_000, 10_000).unwrap_err();
        match err {
            CoreError::InsufficientPayment { total, amount_paid } => {
                assert_eq!(total, 14_000);
                assert_eq!(amount_paid, 10_000);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_settle_clamps_discount() {
        let p = product("P3", 2_000, 5);
        let items = vec![frozen(&p, 1)];

        // Discount above the subtotal clamps to it: total 0
        let b = settle(&items, 10_000, 0).unwrap();
        assert_eq!(b.discount.units(), 2_000);
        assert_eq!(b.total.units(), 0);
        assert_eq!(b.change.units(), 0);

        // Negative discount clamps to zero
        let b = settle(&items, -500, 2_000).unwrap();
        assert_eq!(b.discount.units(), 0);
        assert_eq!(b.total.units(), 2_000);
    }

    #[test]
    fn test_settle_multi_line_subtotal() {
        let a = product("A", 3_500, 10);
        let b_ = product("B", 1_500, 10);
        let items = vec![frozen(&a, 2), frozen(&b_, 4)];

        let b = settle(&items, 0, 13_000).unwrap();
        assert_eq!(b.subtotal.units(), 7_000 + 6_000);
        assert_eq!(b.change.units(), 0);
    }
}
