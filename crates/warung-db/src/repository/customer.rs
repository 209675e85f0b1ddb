//! # Customer Repository
//!
//! CRUD for the customer name book used by the debt ledger.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use warung_core::{Customer, CustomerUpdate};

/// Repository for customer operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

const CUSTOMER_COLUMNS: &str = "id, name, phone, address, created_at, updated_at";

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Lists customers sorted by name, optionally filtered by a name
    /// substring.
    pub async fn find_all(&self, search: Option<&str>) -> DbResult<Vec<Customer>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE 1 = 1"));

        if let Some(search) = search {
            qb.push(" AND name LIKE ")
                .push_bind(format!("%{}%", search.trim()));
        }

        qb.push(" ORDER BY name");

        let customers = qb.build_query_as::<Customer>().fetch_all(&self.pool).await?;
        Ok(customers)
    }

    /// Gets a customer by id. `Ok(None)` when absent.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Inserts a new customer.
    pub async fn insert(&self, customer: &Customer) -> DbResult<Customer> {
        debug!(id = %customer.id, name = %customer.name, "Inserting customer");

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
        .execute(&self.pool)
        .await?;

        Ok(customer.clone())
    }

    /// Merges partial fields into an existing customer and returns the
    /// updated record. Bumps `updated_at`.
    pub async fn update(&self, id: &str, patch: &CustomerUpdate) -> DbResult<Customer> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = COALESCE(?2, name),
                phone = COALESCE(?3, phone),
                address = COALESCE(?4, address),
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref().map(str::trim))
        .bind(patch.phone.as_deref().map(str::trim))
        .bind(patch.address.as_deref().map(str::trim))
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Deletes a customer and returns the removed record. Debts keep
    /// their customer name string - the ledger references customers by
    /// name, not by id.
    pub async fn remove(&self, id: &str) -> DbResult<Customer> {
        let customer = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))?;

        sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(customer)
    }
}
