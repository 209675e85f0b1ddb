//! # warung-db: Database Layer for Warung POS
//!
//! This crate provides storage and the settlement engine for the Warung
//! POS system. It uses SQLite for local storage with sqlx for async
//! operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Warung POS Data Flow                           │
//! │                                                                     │
//! │  Caller (HTTP layer, CLI, tests)                                    │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                    warung-db (THIS CRATE)                     │ │
//! │  │                                                               │ │
//! │  │  ┌────────────┐  ┌──────────────┐  ┌────────────────────┐   │ │
//! │  │  │  Database  │  │ Repositories │  │  SettlementEngine  │   │ │
//! │  │  │ (pool.rs)  │  │ product.rs   │  │  process_checkout  │   │ │
//! │  │  │            │◄─│ debt.rs ...  │◄─│  pay_debt          │   │ │
//! │  │  │ SqlitePool │  │              │  │  create_debt       │   │ │
//! │  │  └────────────┘  └──────────────┘  └────────────────────┘   │ │
//! │  │                                                               │ │
//! │  │  + embedded migrations, JSON backup/restore                   │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite database file (WAL mode)                                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and the [`Database`] handle
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and settlement error types
//! - [`repository`] - Repository implementations (product, debt, ...)
//! - [`settlement`] - The settlement engine (checkout + debt lifecycle)
//! - [`backup`] - JSON export/restore
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warung_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/warung.db")).await?;
//!
//! // Catalog
//! let products = db.products().find_all(&Default::default()).await?;
//!
//! // Checkout
//! let transaction = db.settlement().process_checkout(request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backup;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod settlement;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, SettlementError, SettlementResult};
pub use pool::{Database, DbConfig};
pub use settlement::SettlementEngine;

// Repository re-exports for convenience
pub use backup::{BackupDocument, BackupService, RestoreReport};
pub use repository::category::CategoryRepository;
pub use repository::customer::CustomerRepository;
pub use repository::debt::{DailyDebtStats, DebtFilter, DebtRepository, DebtStats, DebtStatus};
pub use repository::product::{ProductFilter, ProductRepository, ProductSort, SortOrder};
pub use repository::transaction::{DailySummary, TransactionFilter, TransactionRepository};
