//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD operations
//! - Restock / stock correction with a non-negative guard
//!
//! Checkout never goes through this repository; its stock decrement lives in
//! [`UnitOfWork::take_stock`](crate::unit_of_work::UnitOfWork::take_stock) so
//! it shares the sale's storage transaction.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use kasir_core::{Product, ProductDraft};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let laptop = repo.get_by_id(1).await?;
/// let all = repo.list().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price_cents, category_id, stock, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists all products ordered by ID.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price_cents, category_id, stock, created_at, updated_at
            FROM products
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product with its store-generated ID
    /// * `Err(DbError::ForeignKeyViolation)` - `category_id` doesn't exist
    pub async fn insert(&self, draft: &ProductDraft) -> DbResult<Product> {
        let name = draft.name.trim();
        debug!(name = %name, "Inserting product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO products (name, price_cents, category_id, stock, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
        )
        .bind(name)
        .bind(draft.price_cents)
        .bind(draft.category_id)
        .bind(draft.stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Product {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            price_cents: draft.price_cents,
            category_id: draft.category_id,
            stock: draft.stock,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces every editable field of an existing product.
    ///
    /// Price changes never touch recorded transactions; lines carry their
    /// own unit price snapshot.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Updated product
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: i64, draft: &ProductDraft) -> DbResult<Product> {
        debug!(id = id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                price_cents = ?3,
                category_id = ?4,
                stock = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(draft.name.trim())
        .bind(draft.price_cents)
        .bind(draft.category_id)
        .bind(draft.stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Adds `delta` to a tracked product's stock.
    ///
    /// ## Guard
    /// ```text
    /// UPDATE ... WHERE id = ? AND stock IS NOT NULL AND stock + delta >= 0
    ///                 AND stock <= i64::MAX - delta     (delta > 0 only)
    /// ```
    /// The check and the write are one statement, so a concurrent checkout
    /// can never observe or produce a negative level. SQLite turns an
    /// overflowing integer sum into a REAL, so the upper bound is checked
    /// before the addition can happen.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Stock adjusted
    /// * `Ok(None)` - No row matched: product missing, untracked, or the
    ///   result would be negative or exceed `i64::MAX`
    pub async fn adjust_stock(&self, id: i64, delta: i64) -> DbResult<Option<Product>> {
        debug!(id = id, delta = delta, "Adjusting stock");

        let now = Utc::now();

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET stock = stock + ?2,
                updated_at = ?3
            WHERE id = ?1
              AND stock IS NOT NULL
              AND stock <= CASE WHEN ?2 > 0 THEN 9223372036854775807 - ?2 ELSE stock END
              AND stock + ?2 >= 0
            RETURNING id, name, price_cents, category_id, stock, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Deletes a product.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(DbError::ForeignKeyViolation)` - Product appears on a
    ///   recorded transaction line
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts total products (for diagnostics).
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

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use kasir_core::{CategoryDraft, ProductDraft};

    fn draft(name: &str, price_cents: i64, stock: Option<i64>) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            price_cents,
            category_id: None,
            stock,
        }
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = db().await;
        let repo = db.products();

        let laptop = repo.insert(&draft("  Laptop ", 99_999, None)).await.unwrap();
        assert_eq!(laptop.name, "Laptop");
        assert!(laptop.id > 0);

        let fetched = repo.get_by_id(laptop.id).await.unwrap().unwrap();
        assert_eq!(fetched.price_cents, 99_999);
        assert_eq!(fetched.stock, None);

        assert!(repo.get_by_id(9_999).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_ids_are_store_generated_and_increasing() {
        let db = db().await;
        let repo = db.products();

        let a = repo.insert(&draft("A", 100, None)).await.unwrap();
        let b = repo.insert(&draft("B", 200, None)).await.unwrap();
        assert!(b.id > a.id);

        let ids: Vec<i64> = repo.list().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn test_unknown_category_is_rejected_by_store() {
        let db = db().await;
        let mut d = draft("Kettle", 2_500, None);
        d.category_id = Some(42);

        let err = db.products().insert(&d).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_update() {
        let db = db().await;
        let repo = db.products();
        let electronics = db
            .categories()
            .insert(&CategoryDraft {
                name: "Electronics".into(),
                description: String::new(),
            })
            .await
            .unwrap();

        let tablet = repo.insert(&draft("Tablet", 29_999, None)).await.unwrap();

        let mut d = draft("Tablet Pro", 39_999, Some(3));
        d.category_id = Some(electronics.id);
        let updated = repo.update(tablet.id, &d).await.unwrap();

        assert_eq!(updated.name, "Tablet Pro");
        assert_eq!(updated.category_id, Some(electronics.id));
        assert_eq!(updated.stock, Some(3));

        let err = repo.update(9_999, &d).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_adjust_stock_guards() {
        let db = db().await;
        let repo = db.products();

        let tracked = repo.insert(&draft("Phone", 49_999, Some(2))).await.unwrap();
        let untracked = repo.insert(&draft("Gift card", 5_000, None)).await.unwrap();

        let restocked = repo.adjust_stock(tracked.id, 5).await.unwrap().unwrap();
        assert_eq!(restocked.stock, Some(7));

        assert!(repo.adjust_stock(tracked.id, -8).await.unwrap().is_none());
        assert!(repo.adjust_stock(untracked.id, 1).await.unwrap().is_none());
        assert!(repo.adjust_stock(9_999, 1).await.unwrap().is_none());

        let unchanged = repo.get_by_id(tracked.id).await.unwrap().unwrap();
        assert_eq!(unchanged.stock, Some(7));
    }

    #[tokio::test]
    async fn test_adjust_stock_rejects_overflow() {
        let db = db().await;
        let repo = db.products();

        let tracked = repo.insert(&draft("Phone", 49_999, Some(5))).await.unwrap();

        assert!(repo.adjust_stock(tracked.id, i64::MAX).await.unwrap().is_none());
        assert!(repo.adjust_stock(tracked.id, i64::MAX - 4).await.unwrap().is_none());

        // The row still decodes as an integer level
        let unchanged = repo.get_by_id(tracked.id).await.unwrap().unwrap();
        assert_eq!(unchanged.stock, Some(5));

        let topped = repo
            .adjust_stock(tracked.id, i64::MAX - 5)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(topped.stock, Some(i64::MAX));
        assert!(repo.adjust_stock(tracked.id, 1).await.unwrap().is_none());

        let drained = repo
            .adjust_stock(tracked.id, -i64::MAX)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(drained.stock, Some(0));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = db().await;
        let repo = db.products();

        let p = repo.insert(&draft("Fan", 1_999, None)).await.unwrap();
        repo.delete(p.id).await.unwrap();
        assert!(repo.get_by_id(p.id).await.unwrap().is_none());

        let err = repo.delete(p.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
