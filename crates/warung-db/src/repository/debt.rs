//! # Debt Repository
//!
//! Database operations for the customer receivables ledger.
//!
//! ## Lifecycle Guard
//! A debt flips from unpaid to paid exactly once. The flip itself
//! ([`mark_paid_with`](DebtRepository::mark_paid_with)) is a conditional
//! update that only the settlement engine calls, inside the same
//! transaction that appends the DEBT_PAYMENT record - two concurrent
//! payment attempts cannot both succeed.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use warung_core::Debt;

// =============================================================================
// Filter & Stats
// =============================================================================

/// Paid-state filter for debt listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebtStatus {
    #[default]
    All,
    Paid,
    Unpaid,
}

/// Debt listing filter. Results are always newest-first.
#[derive(Debug, Clone, Default)]
pub struct DebtFilter {
    pub status: DebtStatus,
    /// Substring match on the customer name.
    pub search: Option<String>,
}

/// Aggregate statistics over the whole debt ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtStats {
    pub total: i64,
    pub unpaid_count: i64,
    pub paid_count: i64,
    /// Sum of amounts still outstanding.
    pub total_unpaid: i64,
}

/// Debts recorded today (feeds the cross-domain daily dashboard;
/// kept here rather than on the transaction repository so each
/// repository stays single-responsibility).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyDebtStats {
    pub debt_count: i64,
    pub total_debt: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for debt ledger operations.
#[derive(Debug, Clone)]
pub struct DebtRepository {
    pool: SqlitePool,
}

const DEBT_COLUMNS: &str =
    "id, customer_name, amount, description, due_date, is_paid, paid_at, created_at";

impl DebtRepository {
    /// Creates a new DebtRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DebtRepository { pool }
    }

    /// Lists debts with optional paid-state and customer search filters.
    pub async fn find_all(&self, filter: &DebtFilter) -> DbResult<Vec<Debt>> {
        debug!(?filter, "Listing debts");

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {DEBT_COLUMNS} FROM debts WHERE 1 = 1"));

        match filter.status {
            DebtStatus::All => {}
            DebtStatus::Paid => {
                qb.push(" AND is_paid = 1");
            }
            DebtStatus::Unpaid => {
                qb.push(" AND is_paid = 0");
            }
        }

        if let Some(search) = &filter.search {
            qb.push(" AND customer_name LIKE ")
                .push_bind(format!("%{}%", search.trim()));
        }

        qb.push(" ORDER BY created_at DESC");

        let debts = qb.build_query_as::<Debt>().fetch_all(&self.pool).await?;
        Ok(debts)
    }

    /// Gets a debt by id. `Ok(None)` when absent.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Debt>> {
        let debt =
            sqlx::query_as::<_, Debt>(&format!("SELECT {DEBT_COLUMNS} FROM debts WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(debt)
    }

    /// Persists a new (unpaid) debt.
    pub async fn insert(&self, debt: &Debt) -> DbResult<Debt> {
        debug!(id = %debt.id, customer = %debt.customer_name, amount = %debt.amount, "Inserting debt");

        sqlx::query(
            r#"
            INSERT INTO debts (
                id, customer_name, amount, description, due_date,
                is_paid, paid_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&debt.id)
        .bind(&debt.customer_name)
        .bind(debt.amount)
        .bind(&debt.description)
        .bind(debt.due_date)
        .bind(debt.is_paid)
        .bind(debt.paid_at)
        .bind(debt.created_at)
        .execute(&self.pool)
        .await?;

        Ok(debt.clone())
    }

    /// Conditionally flips a debt to paid on an existing connection.
    ///
    /// Returns the number of rows affected: 1 when this call won the
    /// transition, 0 when the debt is missing or was already paid.
    /// Settlement-engine use only - the `is_paid = 0` condition is the
    /// idempotency guard under concurrent callers.
    pub async fn mark_paid_with(
        conn: &mut SqliteConnection,
        id: &str,
        paid_at: DateTime<Utc>,
    ) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE debts
            SET is_paid = 1, paid_at = ?2
            WHERE id = ?1 AND is_paid = 0
            "#,
        )
        .bind(id)
        .bind(paid_at)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Deletes a debt and returns the removed record.
    ///
    /// No cascade: transactions already recorded against this debt stay
    /// in the ledger untouched.
    pub async fn remove(&self, id: &str) -> DbResult<Debt> {
        let debt = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Debt", id))?;

        sqlx::query("DELETE FROM debts WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(id = %id, customer = %debt.customer_name, "Debt removed");
        Ok(debt)
    }

    /// Aggregates paid/unpaid counts and the outstanding total.
    pub async fn stats(&self) -> DbResult<DebtStats> {
        let (total, paid_count, total_unpaid): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(is_paid), 0),
                COALESCE(SUM(CASE WHEN is_paid = 0 THEN amount ELSE 0 END), 0)
            FROM debts
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DebtStats {
            total,
            unpaid_count: total - paid_count,
            paid_count,
            total_unpaid,
        })
    }

    /// Aggregates debts recorded today (UTC).
    pub async fn daily_stats(&self) -> DbResult<DailyDebtStats> {
        let start = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();

        let (debt_count, total_debt): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(amount), 0)
            FROM debts
            WHERE created_at >= ?1
            "#,
        )
        .bind(start)
        .fetch_one(&self.pool)
        .await?;

        Ok(DailyDebtStats {
            debt_count,
            total_debt,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
