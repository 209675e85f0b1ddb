//! # Backup & Restore
//!
//! Whole-database export to a single JSON document, and the matching
//! restore. The document carries every collection plus a version tag so
//! old backups keep importing after schema growth.
//!
//! ## Restore Semantics
//! Import REPLACES the current contents of every collection, inside one
//! transaction: a failed restore leaves the database exactly as it was.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::repository::category::CategoryRepository;
use crate::repository::customer::CustomerRepository;
use crate::repository::debt::{DebtFilter, DebtRepository};
use crate::repository::product::{ProductFilter, ProductRepository};
use crate::repository::transaction::{TransactionFilter, TransactionRepository};
use warung_core::{Category, Customer, Debt, Product, Transaction};

/// Current backup document version.
pub const BACKUP_VERSION: u32 = 1;

// =============================================================================
// Document
// =============================================================================

/// A complete snapshot of the shop's data, serializable with serde_json.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub products: Vec<Product>,
    pub transactions: Vec<Transaction>,
    pub debts: Vec<Debt>,
    pub categories: Vec<Category>,
    pub customers: Vec<Customer>,
}

/// Row counts written by a restore.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReport {
    pub products: usize,
    pub transactions: usize,
    pub debts: usize,
    pub categories: usize,
    pub customers: usize,
}

// =============================================================================
// Service
// =============================================================================

/// Backup/restore over the shared pool.
#[derive(Debug, Clone)]
pub struct BackupService {
    pool: SqlitePool,
}

impl BackupService {
    /// Creates a new BackupService.
    pub fn new(pool: SqlitePool) -> Self {
        BackupService { pool }
    }

    /// Exports every collection into one document.
    pub async fn export(&self) -> DbResult<BackupDocument> {
        let products = ProductRepository::new(self.pool.clone())
            .find_all(&ProductFilter::default())
            .await?;
        let transactions = TransactionRepository::new(self.pool.clone())
            .find_all(&TransactionFilter::default())
            .await?;
        let debts = DebtRepository::new(self.pool.clone())
            .find_all(&DebtFilter::default())
            .await?;
        let categories = CategoryRepository::new(self.pool.clone()).find_all().await?;
        let customers = CustomerRepository::new(self.pool.clone())
            .find_all(None)
            .await?;

        info!(
            products = products.len(),
            transactions = transactions.len(),
            debts = debts.len(),
            "Backup exported"
        );

        Ok(BackupDocument {
            version: BACKUP_VERSION,
            exported_at: Utc::now(),
            products,
            transactions,
            debts,
            categories,
            customers,
        })
    }

    /// Replaces every collection with the document's contents, in one
    /// transaction. The pre-import data is gone after a successful
    /// restore and fully intact after a failed one.
    pub async fn import(&self, document: &BackupDocument) -> DbResult<RestoreReport> {
        if document.version > BACKUP_VERSION {
            return Err(DbError::Internal(format!(
                "unsupported backup version {} (this build reads up to {})",
                document.version, BACKUP_VERSION
            )));
        }

        let mut tx = self.pool.begin().await?;

        // Children before parents for the FK between items and headers.
        for table in [
            "transaction_items",
            "transactions",
            "products",
            "debts",
            "categories",
            "customers",
        ] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await?;
        }

        for product in &document.products {
            sqlx::query(
                r#"
                INSERT INTO products (id, name, category, price, stock, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&product.id)
            .bind(&product.name)
            .bind(&product.category)
            .bind(product.price)
            .bind(product.stock)
            .bind(product.created_at)
            .bind(product.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        for transaction in &document.transactions {
            TransactionRepository::insert_with(&mut tx, transaction).await?;
        }

        for debt in &document.debts {
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
            .execute(&mut *tx)
            .await?;
        }

        for category in &document.categories {
            sqlx::query("INSERT INTO categories (id, name, color, created_at) VALUES (?1, ?2, ?3, ?4)")
                .bind(&category.id)
                .bind(&category.name)
                .bind(&category.color)
                .bind(category.created_at)
                .execute(&mut *tx)
                .await?;
        }

        for customer in &document.customers {
            sqlx::query(
                r#"
                INSERT INTO customers (id, name, phone, address, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&customer.id)
            .bind(&customer.name)
            .bind(&customer.phone)
            .bind(&customer.address)
            .bind(customer.created_at)
            .bind(customer.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let report = RestoreReport {
            products: document.products.len(),
            transactions: document.transactions.len(),
            debts: document.debts.len(),
            categories: document.categories.len(),
            customers: document.customers.len(),
        };

        info!(?report, "Backup restored");
        Ok(report)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use warung_core::{CartLine, CheckoutRequest, NewDebt, NewProduct, PaymentMethod};

    async fn seeded_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let p = db
            .products()
            .insert(&Product::new(NewProduct {
                name: "Teh Botol".to_string(),
                category: "Minuman".to_string(),
                price: 4_000,
                stock: 10,
            }))
            .await
            .unwrap();

        db.settlement()
            .process_checkout(CheckoutRequest {
                items: vec![CartLine {
                    product_id: p.id.clone(),
                    quantity: 2,
                }],
                amount_paid: 8_000,
                discount: 0,
                payment_method: PaymentMethod::Qris,
                note: String::new(),
            })
            .await
            .unwrap();

        db.settlement()
            .create_debt(NewDebt {
                customer_name: "Budi".to_string(),
                amount: 50_000,
                description: String::new(),
                due_date: None,
            })
            .await
            .unwrap();

        db
    }

    #[tokio::test]
    async fn test_export_import_round_trip() {
        let source = seeded_db().await;
        let document = source.backup().export().await.unwrap();

        assert_eq!(document.version, BACKUP_VERSION);
        assert_eq!(document.products.len(), 1);
        assert_eq!(document.transactions.len(), 1);
        assert_eq!(document.debts.len(), 1);

        // JSON round-trip, then restore into a fresh database
        let json = serde_json::to_string(&document).unwrap();
        let parsed: BackupDocument = serde_json::from_str(&json).unwrap();

        let target = Database::new(DbConfig::in_memory()).await.unwrap();
        let report = target.backup().import(&parsed).await.unwrap();
        assert_eq!(report.products, 1);
        assert_eq!(report.transactions, 1);

        let restored = target
            .transactions()
            .find_all(&TransactionFilter::default())
            .await
            .unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].total, 8_000);
        assert_eq!(restored[0].items.len(), 1);
        assert_eq!(restored[0].items[0].name, "Teh Botol");

        let products = target
            .products()
            .find_all(&ProductFilter::default())
            .await
            .unwrap();
        assert_eq!(products[0].stock, 8); // post-checkout stock travels with the backup
    }

    #[tokio::test]
    async fn test_import_replaces_existing_data() {
        let source = seeded_db().await;
        let document = source.backup().export().await.unwrap();

        let target = seeded_db().await;
        // Extra record that must vanish after restore
        target
            .settlement()
            .create_debt(NewDebt {
                customer_name: "Siti".to_string(),
                amount: 10_000,
                description: String::new(),
                due_date: None,
            })
            .await
            .unwrap();

        target.backup().import(&document).await.unwrap();

        let debts = target.debts().find_all(&DebtFilter::default()).await.unwrap();
        assert_eq!(debts.len(), 1);
        assert_eq!(debts[0].customer_name, "Budi");
    }

    #[tokio::test]
    async fn test_import_rejects_newer_version() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut document = db.backup().export().await.unwrap();
        document.version = BACKUP_VERSION + 1;

        let err = db.backup().import(&document).await;
        assert!(matches!(err, Err(DbError::Internal(_))));
    }
}
