//! # Database Error Types
//!
//! Error types for storage operations, plus the settlement engine's
//! combined error.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Error Propagation                            │
//! │                                                                     │
//! │  SQLite Error (sqlx::Error)                                         │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  DbError (this module) ← categorized infrastructure failure         │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SettlementError::Db ─── propagated, never swallowed                │
//! │                                                                     │
//! │  CoreError (warung-core)                                            │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SettlementError::Rejected ─── recovered locally; the caller        │
//! │  branches on it without touching the Db arm                         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use warung_core::CoreError;

// =============================================================================
// DbError
// =============================================================================

/// Storage operation errors.
///
/// These wrap sqlx errors and add context for debugging. They represent
/// infrastructure failures, never business rules.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in the database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A CHECK / UNIQUE / NOT NULL constraint rejected a write.
    ///
    /// The settlement engine's own guards fire first; seeing this means
    /// a code path bypassed them or the database file was edited by hand.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Database connection failed (missing file permissions, disk full,
    /// pool closed).
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use past the acquire timeout).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound   → DbError::NotFound
/// sqlx::Error::Database      → ConstraintViolation | QueryFailed
/// sqlx::Error::PoolTimedOut  → DbError::PoolExhausted
/// Other                      → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record",
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();
                if msg.contains("constraint failed") {
                    DbError::ConstraintViolation(msg)
                } else {
                    DbError::QueryFailed(msg)
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// SettlementError
// =============================================================================

/// Combined error for the settlement engine's operations.
///
/// Splits the failure taxonomy at the type level: `Rejected`
/// carries a business-rule failure (nothing was mutated, the caller can
/// show the message and move on); `Db` carries an infrastructure failure
/// that the caller may retry or escalate.
#[derive(Debug, Error)]
pub enum SettlementError {
    /// Validation or business-rule rejection. No state was mutated.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// Infrastructure failure during read or commit.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl SettlementError {
    /// True when the failure is a business rejection rather than an
    /// infrastructure problem.
    pub fn is_rejection(&self) -> bool {
        matches!(self, SettlementError::Rejected(_))
    }
}

/// Result type for settlement operations.
pub type SettlementResult<T> = Result<T, SettlementError>;

// =============================================================================
// Unit Tests
// =============================================================================
