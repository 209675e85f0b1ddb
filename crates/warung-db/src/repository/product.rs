//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - Filtered/sorted catalog listing (category, name search)
//! - CRUD
//! - Restock via delta adjustment
//!
//! Checkout-time stock decrements are NOT here: they live in the
//! settlement engine, inside the same transaction that appends the sale
//! record. [`adjust_stock`](ProductRepository::adjust_stock) is the
//! restock/correction path only.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use warung_core::{Product, ProductUpdate};

// =============================================================================
// Filters
// =============================================================================

/// Sort key for catalog listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    #[default]
    Name,
    Price,
    Stock,
    CreatedAt,
}

impl ProductSort {
    fn column(self) -> &'static str {
        match self {
            ProductSort::Name => "name",
            ProductSort::Price => "price",
            ProductSort::Stock => "stock",
            ProductSort::CreatedAt => "created_at",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Catalog listing filter. `Default` lists everything sorted by name.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Exact category match (case-insensitive). `None` = all categories.
    pub category: Option<String>,
    /// Substring match on the product name.
    pub search: Option<String>,
    pub sort_by: ProductSort,
    pub order: SortOrder,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product catalog operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let snacks = repo
///     .find_all(&ProductFilter { category: Some("Snack".into()), ..Default::default() })
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

const PRODUCT_COLUMNS: &str = "id, name, category, price, stock, created_at, updated_at";

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products with optional category/search filters and sort.
    pub async fn find_all(&self, filter: &ProductFilter) -> DbResult<Vec<Product>> {
        debug!(?filter, "Listing products");

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE 1 = 1"));

        if let Some(category) = &filter.category {
            qb.push(" AND category = ")
                .push_bind(category.clone())
                .push(" COLLATE NOCASE");
        }

        if let Some(search) = &filter.search {
            qb.push(" AND name LIKE ")
                .push_bind(format!("%{}%", search.trim()));
        }

        qb.push(format!(
            " ORDER BY {} {}",
            filter.sort_by.column(),
            filter.order.keyword()
        ));

        let products = qb.build_query_as::<Product>().fetch_all(&self.pool).await?;

        Ok(products)
    }

    /// Returns the distinct category strings present in the catalog.
    pub async fn find_categories(&self) -> DbResult<Vec<String>> {
        let categories: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT category FROM products ORDER BY category")
                .fetch_all(&self.pool)
                .await?;

        Ok(categories)
    }

    /// Gets a product by its id. `Ok(None)` when absent.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

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
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Merges partial fields into an existing product and returns the
    /// updated record.
    ///
    /// Stock is not part of [`ProductUpdate`]; use
    /// [`adjust_stock`](Self::adjust_stock) for restocks.
    pub async fn update(&self, id: &str, patch: &ProductUpdate) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = COALESCE(?2, name),
                category = COALESCE(?3, category),
                price = COALESCE(?4, price),
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref().map(str::trim))
        .bind(patch.category.as_deref().map(str::trim))
        .bind(patch.price)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Adjusts the stock level by a delta (positive for restock,
    /// negative for a manual correction) and returns the updated record.
    ///
    /// ## Errors
    /// - `NotFound` when the product doesn't exist
    /// - `ConstraintViolation` when the adjustment would take stock
    ///   below zero
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<Product> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock + ?2, updated_at = ?3
            WHERE id = ?1 AND stock + ?2 >= 0
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.find_by_id(id).await? {
                Some(product) => Err(DbError::ConstraintViolation(format!(
                    "stock adjustment of {} would take \"{}\" below zero (current: {})",
                    delta, product.name, product.stock
                ))),
                None => Err(DbError::not_found("Product", id)),
            };
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product and returns the removed record.
    ///
    /// Historical transactions are untouched: line items carry frozen
    /// name/price and only a weak product reference.
    pub async fn remove(&self, id: &str) -> DbResult<Product> {
        let product = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(id = %id, name = %product.name, "Product removed");
        Ok(product)
    }

    /// Counts products (for diagnostics and seed guards).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
