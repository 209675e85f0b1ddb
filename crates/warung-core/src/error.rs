//! # Error Types
//!
//! Domain-specific error types for warung-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                           Error Types                               │
//! │                                                                     │
//! │  warung-core errors (this file)                                     │
//! │  ├── CoreError        - Business-rule failures                      │
//! │  └── ValidationError  - Input shape/bounds failures                 │
//! │                                                                     │
//! │  warung-db errors (separate crate)                                  │
//! │  ├── DbError          - Infrastructure failures                     │
//! │  └── SettlementError  - Rejected(CoreError) | Db(DbError)           │
//! │                                                                     │
//! │  Business failures are recovered locally into a structured result;  │
//! │  infrastructure failures propagate to the caller.                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, amounts, debt id)
//! 3. Errors are enum variants, never String
//! 4. Each variant maps to a user-facing message naming the offender

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business-rule failures.
///
/// These are rejected operations, not crashes: the engine checks them
/// after validation but before commit, and no state is mutated when one
/// is returned.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A cart line references a product id that does not exist
    /// (or was deleted between the client loading the catalog and
    /// submitting the cart).
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// A cart line asks for more units than the shelf holds.
    ///
    /// Carries the offending product and the quantity that IS available
    /// so the cashier can adjust the cart instead of guessing.
    #[error("Insufficient stock for \"{name}\": available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        name: String,
        available: i64,
        requested: i64,
    },

    /// The customer handed over less than the discounted total.
    #[error("Insufficient payment: total {total}, paid {amount_paid}")]
    InsufficientPayment { total: i64, amount_paid: i64 },

    /// Debt id does not exist.
    #[error("Debt not found: {0}")]
    DebtNotFound(String),

    /// The debt was already settled. Repaying is a rejected operation,
    /// not a no-op success - callers must be alerted to the duplicate
    /// attempt.
    #[error("Debt already paid: {0}")]
    DebtAlreadyPaid(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input shape/bounds failures.
///
/// Caught before any state is read. Purely about the payload itself -
/// stock sufficiency, payment sufficiency and idempotency are business
/// rules and live in [`CoreError`].
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// A collection field has no entries.
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    /// Trimmed string value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    /// Value must be strictly positive.
    #[error("{field} must be greater than zero")]
    MustBePositive { field: &'static str },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: &'static str },

    /// Invalid format (e.g. malformed color code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
