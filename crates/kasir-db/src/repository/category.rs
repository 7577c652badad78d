//! # Category Repository
//!
//! Database operations for product categories.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use kasir_core::{Category, CategoryDraft};

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Gets a category by its ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM categories
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Lists all categories ordered by ID.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM categories
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Inserts a new category.
    pub async fn insert(&self, draft: &CategoryDraft) -> DbResult<Category> {
        let name = draft.name.trim();
        debug!(name = %name, "Inserting category");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO categories (name, description, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            "#,
        )
        .bind(name)
        .bind(&draft.description)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Category {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            description: draft.description.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces the name and description of an existing category.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Category doesn't exist
    pub async fn update(&self, id: i64, draft: &CategoryDraft) -> DbResult<Category> {
        debug!(id = id, "Updating category");

        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET
                name = ?2,
                description = ?3,
                updated_at = ?4
            WHERE id = ?1
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(draft.name.trim())
        .bind(&draft.description)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        category.ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Deletes a category.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Category doesn't exist
    /// * `Err(DbError::ForeignKeyViolation)` - Products still reference it
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = id, "Deleting category");

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }

    /// Counts total categories (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use kasir_core::{CategoryDraft, ProductDraft};

    fn draft(name: &str, description: &str) -> CategoryDraft {
        CategoryDraft {
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    #[tokio::test]
    async fn test_crud_round() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();

        let home = repo
            .insert(&draft("Home Appliances", "Appliances for home use"))
            .await
            .unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);

        let renamed = repo
            .update(home.id, &draft("Home", "Appliances for home use"))
            .await
            .unwrap();
        assert_eq!(renamed.name, "Home");
        assert_eq!(renamed.id, home.id);

        repo.delete(home.id).await.unwrap();
        assert!(repo.get_by_id(home.id).await.unwrap().is_none());
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db.categories().update(7, &draft("X", "")).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_referenced_category_cannot_be_deleted() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let electronics = db
            .categories()
            .insert(&draft("Electronics", "Devices and gadgets"))
            .await
            .unwrap();

        db.products()
            .insert(&ProductDraft {
                name: "Laptop".into(),
                price_cents: 99_999,
                category_id: Some(electronics.id),
                stock: None,
            })
            .await
            .unwrap();

        let err = db.categories().delete(electronics.id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert!(db.categories().get_by_id(electronics.id).await.unwrap().is_some());
    }
}
