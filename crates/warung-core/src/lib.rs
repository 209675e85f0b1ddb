//! # warung-core: Pure Business Logic for Warung POS
//!
//! This crate is the **heart** of Warung POS. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Warung POS Architecture                        │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                 Caller (HTTP layer, CLI, tests)               │ │
//! │  │        checkout, pay debt, catalog CRUD, backup               │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │                                   │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │               ★ warung-core (THIS CRATE) ★                    │ │
//! │  │                                                               │ │
//! │  │  ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌────────────┐       │ │
//! │  │  │  types   │ │  money   │ │ checkout │ │ validation │       │ │
//! │  │  │ Product  │ │  Money   │ │ pricing  │ │  reports   │       │ │
//! │  │  │ Debt ... │ │ integer  │ │  math    │ │   rules    │       │ │
//! │  │  └──────────┘ └──────────┘ └──────────┘ └────────────┘       │ │
//! │  │                                                               │ │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │                                   │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │                 warung-db (Storage Layer)                     │ │
//! │  │     SQLite repositories, settlement engine, backup            │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Transaction, Debt, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`checkout`] - Cart pricing: availability, discount clamp, change
//! - [`error`] - Domain error types
//! - [`validation`] - Payload shape/bounds validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every function is deterministic given its input
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are i64 in the smallest
//!    currency unit to avoid float errors
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use warung_core::Money` instead of
// `use warung_core::money::Money`

pub use checkout::{settle, CartLine, CheckoutRequest, SettlementBreakdown};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;
pub use validation::ValidationReport;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum trimmed length for display names (products, categories,
/// customers, debtors).
///
/// ## Business Reason
/// One-character names are almost always an accidental submit; two
/// characters is the shortest real name seen in shop data ("Yu", "Ny").
pub const MIN_NAME_LEN: usize = 2;
