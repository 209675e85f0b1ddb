//! # Transaction Repository
//!
//! Database operations for the settlement ledger.
//!
//! ## Append-Only
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Ledger Integrity                             │
//! │                                                                     │
//! │  This repository exposes INSERT and SELECT. Nothing else.           │
//! │                                                                     │
//! │  • No update: a recorded settlement is immutable                    │
//! │  • No delete: corrections are new records, never edits              │
//! │  • Line items freeze name + unit price at sale time, so catalog     │
//! │    edits and deletes never rewrite history                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use warung_core::{Transaction, TransactionItem, TransactionKind};

// =============================================================================
// Filter
// =============================================================================

/// Ledger listing filter. Results are always newest-first.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Restrict to one transaction kind. `None` = both.
    pub kind: Option<TransactionKind>,
    /// Inclusive lower bound on `created_at`.
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub end_date: Option<DateTime<Utc>>,
}

/// Today's sales at a glance (SALE transactions only; debts have their
/// own daily stats on the debt repository).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    /// UTC day the summary covers (YYYY-MM-DD).
    pub date: String,
    pub transaction_count: i64,
    pub total_revenue: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for ledger operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

const TRANSACTION_COLUMNS: &str =
    "id, kind, discount, total, amount_paid, change, payment_method, note, created_at";

/// A line-item row joined with its grouping key, for batch loading.
struct ItemRow {
    transaction_id: String,
    item: TransactionItem,
}

impl<'r> FromRow<'r, SqliteRow> for ItemRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(ItemRow {
            transaction_id: row.try_get("transaction_id")?,
            item: TransactionItem::from_row(row)?,
        })
    }
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Appends a transaction (header + ordered items) using the pool.
    ///
    /// The settlement engine uses [`insert_with`](Self::insert_with)
    /// instead so the append shares the stock-decrement transaction.
    pub async fn insert(&self, transaction: &Transaction) -> DbResult<Transaction> {
        let mut conn = self.pool.acquire().await?;
        Self::insert_with(&mut conn, transaction).await?;
        Ok(transaction.clone())
    }

    /// Appends a transaction on an existing connection.
    ///
    /// Passing the settlement engine's open transaction here is what
    /// makes "decrement stock + record sale" one atomic commit.
    pub async fn insert_with(
        conn: &mut SqliteConnection,
        transaction: &Transaction,
    ) -> DbResult<()> {
        debug!(
            id = %transaction.id,
            kind = ?transaction.kind,
            total = %transaction.total,
            items = transaction.items.len(),
            "Appending transaction"
        );

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, kind, discount, total, amount_paid, change,
                payment_method, note, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&transaction.id)
        .bind(transaction.kind)
        .bind(transaction.discount)
        .bind(transaction.total)
        .bind(transaction.amount_paid)
        .bind(transaction.change)
        .bind(transaction.payment_method)
        .bind(&transaction.note)
        .bind(transaction.created_at)
        .execute(&mut *conn)
        .await?;

        for (seq, item) in transaction.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO transaction_items (
                    transaction_id, seq, product_id, name, unit_price, quantity, subtotal
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&transaction.id)
            .bind(seq as i64)
            .bind(&item.product_id)
            .bind(&item.name)
            .bind(item.unit_price)
            .bind(item.quantity)
            .bind(item.subtotal)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Gets a transaction (with items) by id. `Ok(None)` when absent.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Transaction>> {
        let header = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(mut transaction) = header else {
            return Ok(None);
        };

        transaction.items = sqlx::query_as::<_, TransactionItem>(
            r#"
            SELECT product_id, name, unit_price, quantity, subtotal
            FROM transaction_items
            WHERE transaction_id = ?1
            ORDER BY seq
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(transaction))
    }

    /// Lists transactions (with items) newest-first, with optional kind
    /// and date-range filters.
    pub async fn find_all(&self, filter: &TransactionFilter) -> DbResult<Vec<Transaction>> {
        debug!(?filter, "Listing transactions");

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE 1 = 1"
        ));

        if let Some(kind) = filter.kind {
            qb.push(" AND kind = ").push_bind(kind);
        }

        if let Some(start) = filter.start_date {
            qb.push(" AND created_at >= ").push_bind(start);
        }

        if let Some(end) = filter.end_date {
            qb.push(" AND created_at <= ").push_bind(end);
        }

        qb.push(" ORDER BY created_at DESC");

        let mut transactions = qb
            .build_query_as::<Transaction>()
            .fetch_all(&self.pool)
            .await?;

        self.attach_items(&mut transactions).await?;
        Ok(transactions)
    }

    /// Batch-loads line items for a page of transactions (one query,
    /// not one per transaction).
    async fn attach_items(&self, transactions: &mut [Transaction]) -> DbResult<()> {
        if transactions.is_empty() {
            return Ok(());
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT transaction_id, product_id, name, unit_price, quantity, subtotal
            FROM transaction_items WHERE transaction_id IN (
            "#,
        );

        let mut separated = qb.separated(", ");
        for transaction in transactions.iter() {
            separated.push_bind(transaction.id.clone());
        }
        qb.push(") ORDER BY transaction_id, seq");

        let rows = qb.build_query_as::<ItemRow>().fetch_all(&self.pool).await?;

        let mut grouped: HashMap<String, Vec<TransactionItem>> = HashMap::new();
        for row in rows {
            grouped.entry(row.transaction_id).or_default().push(row.item);
        }

        for transaction in transactions.iter_mut() {
            if let Some(items) = grouped.remove(&transaction.id) {
                transaction.items = items;
            }
        }

        Ok(())
    }

    /// Summarizes today's sales (count + revenue).
    pub async fn daily_summary(&self) -> DbResult<DailySummary> {
        let today = Utc::now().date_naive();
        let start = today.and_time(NaiveTime::MIN).and_utc();

        let (transaction_count, total_revenue): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total), 0)
            FROM transactions
            WHERE kind = 'SALE' AND created_at >= ?1
            "#,
        )
        .bind(start)
        .fetch_one(&self.pool)
        .await?;

        Ok(DailySummary {
            date: today.to_string(),
            transaction_count,
            total_revenue,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
