//! # Domain Types
//!
//! Core domain types used throughout Warung POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Domain Types                               │
//! │                                                                     │
//! │  ┌───────────────┐   ┌────────────────┐   ┌───────────────┐        │
//! │  │    Product    │   │  Transaction   │   │     Debt      │        │
//! │  │  ───────────  │   │  ────────────  │   │  ───────────  │        │
//! │  │  id (UUID)    │   │  id (UUID)     │   │  id (UUID)    │        │
//! │  │  name         │   │  kind          │   │  customer_name│        │
//! │  │  category     │   │  items[]       │   │  amount       │        │
//! │  │  price        │   │  total/change  │   │  is_paid      │        │
//! │  │  stock        │   │  (append-only) │   │  paid_at      │        │
//! │  └───────────────┘   └────────────────┘   └───────────────┘        │
//! │                                                                     │
//! │  TransactionItem = a priced, named snapshot of one cart line,       │
//! │  frozen into a Transaction at sale time. Product renames or price   │
//! │  edits never rewrite history.                                       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4), immutable.
    pub id: String,

    /// Display name shown to the cashier and on receipts.
    pub name: String,

    /// Free-form category string (matched case-insensitively in filters).
    pub category: String,

    /// Price in the smallest currency unit. Never negative.
    pub price: i64,

    /// Current stock level. Never negative - checkout rejects any cart
    /// that would drive this below zero.
    pub stock: i64,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Builds a new product from a catalog payload, generating id and
    /// timestamps.
    pub fn new(input: NewProduct) -> Self {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            category: input.category.trim().to_string(),
            price: input.price,
            stock: input.stock,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_units(self.price)
    }

    /// Checks whether current stock covers the requested quantity.
    #[inline]
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

/// Payload for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: i64,
    pub stock: i64,
}

/// Partial update for a product. `None` fields are left untouched.
///
/// Stock is deliberately absent: stock moves only through the store's
/// restock path and through checkout.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<i64>,
}

// =============================================================================
// Transaction Kind
// =============================================================================

/// What a ledger transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum TransactionKind {
    /// A cart checkout: items sold, stock decremented.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "SALE"))]
    Sale,
    /// A debt settled: one synthetic line, no stock interaction.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "DEBT_PAYMENT"))]
    DebtPayment,
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid. Debt repayments settle by ledger and carry no method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum PaymentMethod {
    /// Physical cash payment.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "CASH"))]
    Cash,
    /// Bank transfer.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "TRANSFER"))]
    Transfer,
    /// QRIS standard QR payment.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "QRIS"))]
    Qris,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

// =============================================================================
// Transaction Item
// =============================================================================

/// A line item in a transaction.
/// Uses the snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TransactionItem {
    /// Product reference. `None` for the synthetic debt-repayment line.
    /// A weak reference: the product may later be edited or deleted
    /// without invalidating this record.
    pub product_id: Option<String>,

    /// Product name at time of sale (frozen).
    pub name: String,

    /// Unit price at time of sale (frozen).
    pub unit_price: i64,

    /// Quantity sold. Always positive.
    pub quantity: i64,

    /// Line subtotal (unit_price × quantity).
    pub subtotal: i64,
}

impl TransactionItem {
    /// Freezes a cart line against a resolved product.
    pub fn snapshot(product: &Product, quantity: i64) -> Self {
        TransactionItem {
            product_id: Some(product.id.clone()),
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
            subtotal: product.price * quantity,
        }
    }

    /// Builds the single synthetic line of a debt repayment.
    pub fn synthetic(name: impl Into<String>, amount: i64) -> Self {
        TransactionItem {
            product_id: None,
            name: name.into(),
            unit_price: amount,
            quantity: 1,
            subtotal: amount,
        }
    }

    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_units(self.unit_price)
    }

    /// Returns the line subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_units(self.subtotal)
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A recorded settlement: either a completed sale or a debt repayment.
///
/// ## Append-Only
/// Transactions are never updated or deleted after creation - the ledger's
/// integrity depends on this. The stores expose no mutation path.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Transaction {
    pub id: String,

    pub kind: TransactionKind,

    /// Ordered line items. Non-empty. Loaded separately from the header
    /// row by the store.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<TransactionItem>,

    /// Absolute discount applied to the subtotal, already clamped into
    /// `[0, subtotal]`.
    pub discount: i64,

    /// `max(0, subtotal - discount)`.
    pub total: i64,

    /// What the customer handed over. Always ≥ total.
    pub amount_paid: i64,

    /// `amount_paid - total`.
    pub change: i64,

    /// Present on sales; `None` for debt repayments.
    pub payment_method: Option<PaymentMethod>,

    /// Free-text note.
    pub note: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Returns the pre-discount subtotal (sum of line subtotals).
    pub fn subtotal(&self) -> Money {
        self.items
            .iter()
            .fold(Money::zero(), |acc, item| acc + item.subtotal())
    }

    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_units(self.total)
    }
}

// =============================================================================
// Debt
// =============================================================================

/// A customer receivable.
///
/// ## Lifecycle
/// Created unpaid → exactly one transition to paid (recorded together with
/// a DEBT_PAYMENT transaction). Paying an already-paid debt is rejected,
/// not silently ignored.
///
/// A debt owns no items; its amount is a flat receivable, not an itemized
/// cart.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Debt {
    pub id: String,

    pub customer_name: String,

    /// Receivable amount. Always positive.
    pub amount: i64,

    pub description: String,

    #[ts(as = "Option<String>")]
    pub due_date: Option<DateTime<Utc>>,

    pub is_paid: bool,

    /// Set exactly once, when the debt is settled.
    #[ts(as = "Option<String>")]
    pub paid_at: Option<DateTime<Utc>>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Debt {
    /// Builds a new unpaid debt from a ledger payload.
    pub fn new(input: NewDebt) -> Self {
        Debt {
            id: Uuid::new_v4().to_string(),
            customer_name: input.customer_name.trim().to_string(),
            amount: input.amount,
            description: input.description.trim().to_string(),
            due_date: input.due_date,
            is_paid: false,
            paid_at: None,
            created_at: Utc::now(),
        }
    }

    /// Returns the receivable as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_units(self.amount)
    }
}

/// Payload for recording a debt.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewDebt {
    pub customer_name: String,
    pub amount: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub due_date: Option<DateTime<Utc>>,
}

// =============================================================================
// Category
// =============================================================================

/// A product category (display grouping for the catalog).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Hex color used by the client for the category chip.
    pub color: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(input: NewCategory) -> Self {
        Category {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            color: input
                .color
                .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
            created_at: Utc::now(),
        }
    }
}

/// Default chip color for categories created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#C4643C";

/// Payload for creating a category.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Partial update for a category. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
}

// =============================================================================
// Customer
// =============================================================================

/// A known customer (used for the debt ledger's name book).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(input: NewCustomer) -> Self {
        let now = Utc::now();
        Customer {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            phone: input.phone.trim().to_string(),
            address: input.address.trim().to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Payload for creating a customer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewCustomer {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

/// Partial update for a customer. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
