//! # Settlement Engine
//!
//! Converts a cart (or a debt) into a recorded, immutable transaction
//! plus the required state mutation - stock decrement or paid-flag -
//! committed atomically.
//!
//! ## The Two Atomic Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                   process_checkout (SALE)                           │
//! │                                                                     │
//! │  validate shape ──► resolve products ──► check stock ──► price      │
//! │       │                 (snapshot)        (all lines     (discount  │
//! │       │                                    up front)      clamp,    │
//! │       │                                                   change)   │
//! │       ▼                                                             │
//! │  BEGIN ── per line: UPDATE products                                 │
//! │  │          SET stock = stock - qty                                 │
//! │  │          WHERE id = ? AND stock >= qty   ◄── the race guard      │
//! │  │        0 rows? → ROLLBACK, reject                                │
//! │  │        INSERT transaction + items                                │
//! │  └─ COMMIT (both effects, or neither)                               │
//! │                                                                     │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │                      pay_debt (DEBT_PAYMENT)                        │
//! │                                                                     │
//! │  BEGIN ── UPDATE debts SET is_paid = 1, paid_at = ?                 │
//! │  │        WHERE id = ? AND is_paid = 0      ◄── idempotency guard   │
//! │  │        0 rows? → ROLLBACK, reject                                │
//! │  │        INSERT repayment transaction (one synthetic line)         │
//! │  └─ COMMIT                                                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Conditional Updates
//! The validation pass reads a snapshot through the pool; by commit time
//! a concurrent checkout may have taken the stock it saw. The `WHERE
//! stock >= qty` condition re-asserts the invariant at write time, under
//! the write lock, so stock can never go negative no matter how the
//! callers interleave. Same shape for the debt flip: `WHERE is_paid = 0`
//! means exactly one payment wins.
//!
//! This module and the repositories it drives are the ONLY code that
//! decrements stock at sale time or flips `is_paid`.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, SettlementResult};
use crate::repository::debt::DebtRepository;
use crate::repository::transaction::TransactionRepository;
use warung_core::checkout::{check_availability, settle, CheckoutRequest};
use warung_core::validation::{validate_name, validate_positive};
use warung_core::{
    CoreError, Debt, NewDebt, Product, Transaction, TransactionItem, TransactionKind,
    ValidationError,
};

/// The settlement engine.
///
/// Holds its own pool handle; obtain one from
/// [`Database::settlement`](crate::Database::settlement).
#[derive(Debug, Clone)]
pub struct SettlementEngine {
    pool: SqlitePool,
}

impl SettlementEngine {
    /// Creates a new engine over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        SettlementEngine { pool }
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Settles a cart: validates it against current stock and prices,
    /// computes totals, then atomically decrements stock and appends the
    /// SALE transaction.
    ///
    /// ## Errors
    /// - `Rejected(Validation(..))` - empty cart, non-positive quantity
    /// - `Rejected(ProductNotFound)` - unknown product id
    /// - `Rejected(InsufficientStock)` - any line short; nothing mutated
    /// - `Rejected(InsufficientPayment)` - payment below the discounted
    ///   total; nothing mutated
    /// - `Db(..)` - infrastructure failure; the transaction rolls back
    pub async fn process_checkout(&self, request: CheckoutRequest) -> SettlementResult<Transaction> {
        // Shape checks first: they need no storage at all.
        if request.items.is_empty() {
            return Err(CoreError::from(ValidationError::Empty { field: "items" }).into());
        }
        for line in &request.items {
            validate_positive("quantity", line.quantity).map_err(CoreError::from)?;
        }

        debug!(lines = request.items.len(), "Processing checkout");

        // Resolve every line against a snapshot of the catalog.
        let products = self.resolve_products(&request).await?;
        for line in &request.items {
            let product = products
                .get(&line.product_id)
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;
            check_availability(product, line.quantity)?;
        }

        // Freeze line items and price the cart. Order preserved.
        let items: Vec<TransactionItem> = request
            .items
            .iter()
            .map(|line| TransactionItem::snapshot(&products[&line.product_id], line.quantity))
            .collect();

        let breakdown = settle(&items, request.discount, request.amount_paid)?;

        // Atomic commit: decrement every line, append the record.
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        for line in &request.items {
            let result = sqlx::query(
                r#"
                UPDATE products
                SET stock = stock - ?2, updated_at = ?3
                WHERE id = ?1 AND stock >= ?2
                "#,
            )
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

            if result.rows_affected() == 0 {
                // A concurrent checkout took the stock the snapshot saw
                // (or the product vanished mid-flight). Abort the whole
                // cart: earlier decrements in this transaction roll back.
                let current: Option<(String, i64)> =
                    sqlx::query_as("SELECT name, stock FROM products WHERE id = ?1")
                        .bind(&line.product_id)
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(DbError::from)?;

                tx.rollback().await.map_err(DbError::from)?;

                return Err(match current {
                    Some((name, available)) => CoreError::InsufficientStock {
                        product_id: line.product_id.clone(),
                        name,
                        available,
                        requested: line.quantity,
                    },
                    None => CoreError::ProductNotFound(line.product_id.clone()),
                }
                .into());
            }
        }

        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            kind: TransactionKind::Sale,
            items,
            discount: breakdown.discount.units(),
            total: breakdown.total.units(),
            amount_paid: request.amount_paid,
            change: breakdown.change.units(),
            payment_method: Some(request.payment_method),
            note: request.note.trim().to_string(),
            created_at: now,
        };

        TransactionRepository::insert_with(&mut tx, &transaction).await?;
        tx.commit().await.map_err(DbError::from)?;

        info!(
            id = %transaction.id,
            total = %transaction.total,
            change = %transaction.change,
            lines = transaction.items.len(),
            "Checkout settled"
        );

        Ok(transaction)
    }

    /// Loads every product referenced by the cart in one query.
    async fn resolve_products(
        &self,
        request: &CheckoutRequest,
    ) -> SettlementResult<HashMap<String, Product>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, name, category, price, stock, created_at, updated_at \
             FROM products WHERE id IN (",
        );

        let mut separated = qb.separated(", ");
        for line in &request.items {
            separated.push_bind(line.product_id.clone());
        }
        qb.push(")");

        let products = qb
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;

        Ok(products.into_iter().map(|p| (p.id.clone(), p)).collect())
    }

    // =========================================================================
    // Debt Lifecycle
    // =========================================================================

    /// Records a new unpaid debt. No inventory interaction.
    pub async fn create_debt(&self, input: NewDebt) -> SettlementResult<Debt> {
        validate_name("customerName", &input.customer_name).map_err(CoreError::from)?;
        validate_positive("amount", input.amount).map_err(CoreError::from)?;

        let debt = Debt::new(input);
        let debt = DebtRepository::new(self.pool.clone()).insert(&debt).await?;

        info!(id = %debt.id, customer = %debt.customer_name, amount = %debt.amount, "Debt recorded");
        Ok(debt)
    }

    /// Settles a debt: atomically flips it to paid and appends the
    /// DEBT_PAYMENT transaction with its single synthetic line.
    ///
    /// ## Errors
    /// - `Rejected(DebtNotFound)` - unknown id
    /// - `Rejected(DebtAlreadyPaid)` - the debt was settled before (or
    ///   a concurrent payment won the flip); no second record is written
    /// - `Db(..)` - infrastructure failure; the transaction rolls back
    pub async fn pay_debt(&self, debt_id: &str) -> SettlementResult<Debt> {
        let debts = DebtRepository::new(self.pool.clone());

        let debt = debts
            .find_by_id(debt_id)
            .await?
            .ok_or_else(|| CoreError::DebtNotFound(debt_id.to_string()))?;

        if debt.is_paid {
            return Err(CoreError::DebtAlreadyPaid(debt_id.to_string()).into());
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let rows = DebtRepository::mark_paid_with(&mut tx, debt_id, now).await?;
        if rows == 0 {
            // Lost the race between the pre-check and the flip.
            tx.rollback().await.map_err(DbError::from)?;

            return Err(match debts.find_by_id(debt_id).await? {
                Some(_) => CoreError::DebtAlreadyPaid(debt_id.to_string()),
                None => CoreError::DebtNotFound(debt_id.to_string()),
            }
            .into());
        }

        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            kind: TransactionKind::DebtPayment,
            items: vec![TransactionItem::synthetic(
                format!("Debt repayment - {}", debt.customer_name),
                debt.amount,
            )],
            discount: 0,
            total: debt.amount,
            amount_paid: debt.amount,
            change: 0,
            payment_method: None,
            note: format!("Debt repayment for {}", debt.customer_name),
            created_at: now,
        };

        TransactionRepository::insert_with(&mut tx, &transaction).await?;
        tx.commit().await.map_err(DbError::from)?;

        info!(id = %debt.id, customer = %debt.customer_name, amount = %debt.amount, "Debt settled");

        Ok(Debt {
            is_paid: true,
            paid_at: Some(now),
            ..debt
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SettlementError;
    use crate::pool::{Database, DbConfig};
    use crate::repository::transaction::TransactionFilter;
    use std::path::PathBuf;
    use warung_core::{CartLine, NewProduct, PaymentMethod, ProductUpdate};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// File-backed database for tests that need multiple connections
    /// writing concurrently (in-memory SQLite is per-connection).
    async fn file_db() -> (Database, PathBuf) {
        let path = std::env::temp_dir().join(format!("warung-test-{}.db", Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        (db, path)
    }

    fn cleanup(path: &PathBuf) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = path.clone().into_os_string();
            file.push(suffix);
            std::fs::remove_file(file).ok();
        }
    }

    async fn seed_product(db: &Database, name: &str, price: i64, stock: i64) -> Product {
        db.products()
            .insert(&Product::new(NewProduct {
                name: name.to_string(),
                category: "Umum".to_string(),
                price,
                stock,
            }))
            .await
            .unwrap()
    }

    fn cart(lines: &[(&Product, i64)], amount_paid: i64, discount: i64) -> CheckoutRequest {
        CheckoutRequest {
            items: lines
                .iter()
                .map(|(p, qty)| CartLine {
                    product_id: p.id.clone(),
                    quantity: *qty,
                })
                .collect(),
            amount_paid,
            discount,
            payment_method: PaymentMethod::Cash,
            note: String::new(),
        }
    }

    fn rejected(err: SettlementError) -> CoreError {
        match err {
            SettlementError::Rejected(core) => core,
            SettlementError::Db(db) => panic!("expected rejection, got infra error: {db}"),
        }
    }

    #[tokio::test]
    async fn test_checkout_exact_payment_drains_stock() {
        // P1 price=10000 stock=2; buy 2, pay 20000 → total 20000, change 0
        let db = test_db().await;
        let engine = db.settlement();
        let p1 = seed_product(&db, "P1", 10_000, 2).await;

        let tx = engine
            .process_checkout(cart(&[(&p1, 2)], 20_000, 0))
            .await
            .unwrap();

        assert_eq!(tx.kind, TransactionKind::Sale);
        assert_eq!(tx.total, 20_000);
        assert_eq!(tx.change, 0);
        assert_eq!(tx.items.len(), 1);
        assert_eq!(tx.items[0].quantity, 2);

        let p1 = db.products().find_by_id(&p1.id).await.unwrap().unwrap();
        assert_eq!(p1.stock, 0);

        // The ledger holds the persisted record
        let stored = db.transactions().find_by_id(&tx.id).await.unwrap().unwrap();
        assert_eq!(stored.total, 20_000);
        assert_eq!(stored.items.len(), 1);
    }

    #[tokio::test]
    async fn test_checkout_rejects_when_stock_drained() {
        let db = test_db().await;
        let engine = db.settlement();
        let p1 = seed_product(&db, "P1", 10_000, 2).await;

        engine
            .process_checkout(cart(&[(&p1, 2)], 20_000, 0))
            .await
            .unwrap();

        let err = rejected(
            engine
                .process_checkout(cart(&[(&p1, 1)], 10_000, 0))
                .await
                .unwrap_err(),
        );

        match err {
            CoreError::InsufficientStock {
                product_id,
                available,
                requested,
                ..
            } => {
                assert_eq!(product_id, p1.id);
                assert_eq!(available, 0);
                assert_eq!(requested, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_checkout_insufficient_payment_leaves_stock() {
        // P2 price=5000 stock=10; buy 3 discount 1000 → total 14000;
        // paying 10000 is rejected and stock stays at 10
        let db = test_db().await;
        let engine = db.settlement();
        let p2 = seed_product(&db, "P2", 5_000, 10).await;

        let err = rejected(
            engine
                .process_checkout(cart(&[(&p2, 3)], 10_000, 1_000))
                .await
                .unwrap_err(),
        );

        match err {
            CoreError::InsufficientPayment { total, amount_paid } => {
                assert_eq!(total, 14_000);
                assert_eq!(amount_paid, 10_000);
            }
            other => panic!("unexpected error: {other}"),
        }

        let p2 = db.products().find_by_id(&p2.id).await.unwrap().unwrap();
        assert_eq!(p2.stock, 10);

        let ledger = db
            .transactions()
            .find_all(&TransactionFilter::default())
            .await
            .unwrap();
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_all_or_nothing_across_lines() {
        // Line 2 fails validation → line 1's stock must be untouched
        let db = test_db().await;
        let engine = db.settlement();
        let a = seed_product(&db, "A", 2_000, 10).await;
        let b = seed_product(&db, "B", 3_000, 2).await;

        let err = rejected(
            engine
                .process_checkout(cart(&[(&a, 1), (&b, 5)], 50_000, 0))
                .await
                .unwrap_err(),
        );
        assert!(matches!(err, CoreError::InsufficientStock { .. }));

        let a = db.products().find_by_id(&a.id).await.unwrap().unwrap();
        let b = db.products().find_by_id(&b.id).await.unwrap().unwrap();
        assert_eq!(a.stock, 10);
        assert_eq!(b.stock, 2);

        let ledger = db
            .transactions()
            .find_all(&TransactionFilter::default())
            .await
            .unwrap();
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_duplicate_lines_cannot_oversell() {
        // Two lines of the same product pass the per-line snapshot check
        // (2 ≤ 3 twice) but together exceed stock. The conditional
        // decrement catches it and the whole cart rolls back.
        let db = test_db().await;
        let engine = db.settlement();
        let a = seed_product(&db, "A", 2_000, 3).await;

        let err = rejected(
            engine
                .process_checkout(cart(&[(&a, 2), (&a, 2)], 10_000, 0))
                .await
                .unwrap_err(),
        );
        assert!(matches!(err, CoreError::InsufficientStock { .. }));

        let a = db.products().find_by_id(&a.id).await.unwrap().unwrap();
        assert_eq!(a.stock, 3);

        let ledger = db
            .transactions()
            .find_all(&TransactionFilter::default())
            .await
            .unwrap();
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_unknown_product() {
        let db = test_db().await;
        let engine = db.settlement();

        let err = rejected(
            engine
                .process_checkout(CheckoutRequest {
                    items: vec![CartLine {
                        product_id: "missing".to_string(),
                        quantity: 1,
                    }],
                    amount_paid: 1_000,
                    discount: 0,
                    payment_method: PaymentMethod::Cash,
                    note: String::new(),
                })
                .await
                .unwrap_err(),
        );

        assert!(matches!(err, CoreError::ProductNotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_is_validation_failure() {
        let db = test_db().await;
        let engine = db.settlement();

        let err = rejected(
            engine
                .process_checkout(CheckoutRequest {
                    items: vec![],
                    amount_paid: 1_000,
                    discount: 0,
                    payment_method: PaymentMethod::Cash,
                    note: String::new(),
                })
                .await
                .unwrap_err(),
        );
        assert!(matches!(err, CoreError::Validation(_)));

        let ledger = db
            .transactions()
            .find_all(&TransactionFilter::default())
            .await
            .unwrap();
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn test_historical_price_freeze() {
        let db = test_db().await;
        let engine = db.settlement();
        let p = seed_product(&db, "Teh Botol", 4_000, 10).await;

        let tx = engine
            .process_checkout(cart(&[(&p, 2)], 8_000, 0))
            .await
            .unwrap();

        // Reprice and rename the product after the sale
        db.products()
            .update(
                &p.id,
                &ProductUpdate {
                    name: Some("Teh Botol Besar".to_string()),
                    price: Some(6_000),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let stored = db.transactions().find_by_id(&tx.id).await.unwrap().unwrap();
        assert_eq!(stored.items[0].name, "Teh Botol");
        assert_eq!(stored.items[0].unit_price, 4_000);
        assert_eq!(stored.total, 8_000);
    }

    #[tokio::test]
    async fn test_debt_lifecycle_and_idempotency() {
        // Create {Budi, 50000} → pay → paid with DEBT_PAYMENT record;
        // second pay is rejected and records nothing
        let db = test_db().await;
        let engine = db.settlement();

        let debt = engine
            .create_debt(NewDebt {
                customer_name: "Budi".to_string(),
                amount: 50_000,
                description: "Groceries on credit".to_string(),
                due_date: None,
            })
            .await
            .unwrap();
        assert!(!debt.is_paid);

        let paid = engine.pay_debt(&debt.id).await.unwrap();
        assert!(paid.is_paid);
        assert!(paid.paid_at.is_some());

        let stored = db.debts().find_by_id(&debt.id).await.unwrap().unwrap();
        assert!(stored.is_paid);

        let repayments = db
            .transactions()
            .find_all(&TransactionFilter {
                kind: Some(TransactionKind::DebtPayment),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(repayments.len(), 1);
        assert_eq!(repayments[0].total, 50_000);
        assert_eq!(repayments[0].change, 0);
        assert!(repayments[0].payment_method.is_none());
        assert_eq!(repayments[0].items.len(), 1);
        assert!(repayments[0].items[0].product_id.is_none());
        assert_eq!(repayments[0].items[0].quantity, 1);

        // Idempotency guard
        let err = rejected(engine.pay_debt(&debt.id).await.unwrap_err());
        assert!(matches!(err, CoreError::DebtAlreadyPaid(_)));

        let repayments = db
            .transactions()
            .find_all(&TransactionFilter {
                kind: Some(TransactionKind::DebtPayment),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(repayments.len(), 1);
    }

    #[tokio::test]
    async fn test_pay_unknown_debt() {
        let db = test_db().await;
        let engine = db.settlement();

        let err = rejected(engine.pay_debt("missing").await.unwrap_err());
        assert!(matches!(err, CoreError::DebtNotFound(_)));
    }

    #[tokio::test]
    async fn test_create_debt_validates_payload() {
        let db = test_db().await;
        let engine = db.settlement();

        let err = rejected(
            engine
                .create_debt(NewDebt {
                    customer_name: "B".to_string(),
                    amount: 50_000,
                    description: String::new(),
                    due_date: None,
                })
                .await
                .unwrap_err(),
        );
        assert!(matches!(err, CoreError::Validation(_)));

        let err = rejected(
            engine
                .create_debt(NewDebt {
                    customer_name: "Budi".to_string(),
                    amount: 0,
                    description: String::new(),
                    due_date: None,
                })
                .await
                .unwrap_err(),
        );
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_checkouts_last_unit() {
        // Two concurrent checkouts each want the last unit: exactly one
        // succeeds, the other is rejected with InsufficientStock, and
        // stock ends at zero (never negative).
        let (db, path) = file_db().await;
        let p = seed_product(&db, "Last One", 10_000, 1).await;

        let e1 = db.settlement();
        let e2 = db.settlement();
        let c1 = cart(&[(&p, 1)], 10_000, 0);
        let c2 = cart(&[(&p, 1)], 10_000, 0);

        let t1 = tokio::spawn(async move { e1.process_checkout(c1).await });
        let t2 = tokio::spawn(async move { e2.process_checkout(c2).await });
        let results = vec![t1.await.unwrap(), t2.await.unwrap()];

        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);

        let loser = results.into_iter().find(|r| r.is_err()).unwrap();
        match loser.unwrap_err() {
            SettlementError::Rejected(CoreError::InsufficientStock { available, .. }) => {
                assert_eq!(available, 0)
            }
            other => panic!("unexpected error: {other}"),
        }

        let p = db.products().find_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(p.stock, 0);

        let sales = db
            .transactions()
            .find_all(&TransactionFilter::default())
            .await
            .unwrap();
        assert_eq!(sales.len(), 1);

        db.close().await;
        cleanup(&path);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_debt_payments_single_record() {
        let (db, path) = file_db().await;
        let engine = db.settlement();

        let debt = engine
            .create_debt(NewDebt {
                customer_name: "Siti".to_string(),
                amount: 25_000,
                description: String::new(),
                due_date: None,
            })
            .await
            .unwrap();

        let e1 = db.settlement();
        let e2 = db.settlement();
        let id1 = debt.id.clone();
        let id2 = debt.id.clone();

        let t1 = tokio::spawn(async move { e1.pay_debt(&id1).await });
        let t2 = tokio::spawn(async move { e2.pay_debt(&id2).await });
        let results = vec![t1.await.unwrap(), t2.await.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);

        let repayments = db
            .transactions()
            .find_all(&TransactionFilter {
                kind: Some(TransactionKind::DebtPayment),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(repayments.len(), 1);

        db.close().await;
        cleanup(&path);
    }
}
