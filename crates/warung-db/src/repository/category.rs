//! # Category Repository
//!
//! CRUD for catalog display groupings. Plain data-entry plumbing: no
//! business rules beyond what validation already checked.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use warung_core::{Category, CategoryUpdate};

/// Repository for category operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

const CATEGORY_COLUMNS: &str = "id, name, color, created_at";

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists all categories sorted by name.
    pub async fn find_all(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Gets a category by id. `Ok(None)` when absent.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Inserts a new category.
    pub async fn insert(&self, category: &Category) -> DbResult<Category> {
        debug!(id = %category.id, name = %category.name, "Inserting category");

        sqlx::query("INSERT INTO categories (id, name, color, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(&category.id)
            .bind(&category.name)
            .bind(&category.color)
            .bind(category.created_at)
            .execute(&self.pool)
            .await?;

        Ok(category.clone())
    }

    /// Merges partial fields into an existing category and returns the
    /// updated record.
    pub async fn update(&self, id: &str, patch: &CategoryUpdate) -> DbResult<Category> {
        let result = sqlx::query(
            r#"
            UPDATE categories SET
                name = COALESCE(?2, name),
                color = COALESCE(?3, color)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref().map(str::trim))
        .bind(patch.color.as_deref())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Deletes a category and returns the removed record. Products keep
    /// their category string; this only removes the display grouping.
    pub async fn remove(&self, id: &str) -> DbResult<Category> {
        let category = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))?;

        sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use warung_core::{NewCategory, DEFAULT_CATEGORY_COLOR};

    #[tokio::test]
    async fn test_category_crud() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();

        let created = repo
            .insert(&Category::new(NewCategory {
                name: "Minuman".to_string(),
                color: None,
            }))
            .await
            .unwrap();
        assert_eq!(created.color, DEFAULT_CATEGORY_COLOR);

        repo.insert(&Category::new(NewCategory {
            name: "Makanan".to_string(),
            color: Some("#22AA55".to_string()),
        }))
        .await
        .unwrap();

        let all = repo.find_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Makanan"); // sorted by name

        let updated = repo
            .update(
                &created.id,
                &CategoryUpdate {
                    color: Some("#000000".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.color, "#000000");
        assert_eq!(updated.name, "Minuman");

        let removed = repo.remove(&created.id).await.unwrap();
        assert_eq!(removed.id, created.id);
        assert!(repo.find_by_id(&created.id).await.unwrap().is_none());
    }
}
