//! # Catalog Service
//!
//! Product and category management on top of the repositories.
//!
//! ## Reference Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create/update product ── category_id set? ── exists? ── no ──► CategoryNotFound
//! │                                                                         │
//! │  delete category ── any product references it? ── yes ──► InUse        │
//! │  delete product  ── any transaction line references it? ── yes ──► InUse│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! The explicit category check gives a precise error; the foreign keys in
//! the schema catch whatever races past it.

use tracing::{info, warn};

use kasir_core::validation::{validate_category_draft, validate_product_draft};
use kasir_core::{
    CatalogError, Category, CategoryDraft, Product, ProductDraft, ValidationError,
};
use kasir_db::{Database, DbError};

/// Catalog reads and writes.
#[derive(Debug, Clone)]
pub struct CatalogService {
    db: Database,
}

impl CatalogService {
    pub fn new(db: Database) -> Self {
        CatalogService { db }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// `GetProductByID`
    pub async fn get_product(&self, id: i64) -> Result<Product, CatalogError> {
        self.db
            .products()
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.db.products().list().await?)
    }

    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Product, CatalogError> {
        validate_product_draft(draft)?;
        self.ensure_category(draft.category_id).await?;

        let product = self
            .db
            .products()
            .insert(draft)
            .await
            .map_err(|e| reference_error(e, draft.category_id))?;

        info!(id = product.id, name = %product.name, "Product created");
        Ok(product)
    }

    pub async fn update_product(
        &self,
        id: i64,
        draft: &ProductDraft,
    ) -> Result<Product, CatalogError> {
        validate_product_draft(draft)?;
        self.ensure_category(draft.category_id).await?;

        let product = self
            .db
            .products()
            .update(id, draft)
            .await
            .map_err(|e| match e {
                DbError::NotFound { .. } => CatalogError::ProductNotFound(id),
                other => reference_error(other, draft.category_id),
            })?;

        info!(id, "Product updated");
        Ok(product)
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), CatalogError> {
        self.db.products().delete(id).await.map_err(|e| match e {
            DbError::NotFound { .. } => CatalogError::ProductNotFound(id),
            DbError::ForeignKeyViolation { .. } => {
                warn!(id, "Refusing to delete a product that has been sold");
                CatalogError::InUse {
                    entity: "Product",
                    id,
                }
            }
            other => other.into(),
        })?;

        info!(id, "Product deleted");
        Ok(())
    }

    /// Adds `delta` to a product's stock (negative for corrections).
    ///
    /// Fails if the product doesn't track stock or the level would go
    /// below zero.
    pub async fn adjust_stock(&self, id: i64, delta: i64) -> Result<Product, CatalogError> {
        if let Some(product) = self.db.products().adjust_stock(id, delta).await? {
            info!(id, delta, stock = ?product.stock, "Stock adjusted");
            return Ok(product);
        }

        let product = self.get_product(id).await?;
        let err = match product.stock {
            None => ValidationError::InvalidFormat {
                field: "stock".to_string(),
                reason: format!("product {} does not track stock", id),
            },
            Some(current) => ValidationError::OutOfRange {
                field: "stock".to_string(),
                min: -current,
                max: i64::MAX - current,
            },
        };
        Err(err.into())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// `GetCategoryByID`
    pub async fn get_category(&self, id: i64) -> Result<Category, CatalogError> {
        self.db
            .categories()
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::CategoryNotFound(id))
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        Ok(self.db.categories().list().await?)
    }

    pub async fn create_category(&self, draft: &CategoryDraft) -> Result<Category, CatalogError> {
        validate_category_draft(draft)?;

        let category = self.db.categories().insert(draft).await?;
        info!(id = category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn update_category(
        &self,
        id: i64,
        draft: &CategoryDraft,
    ) -> Result<Category, CatalogError> {
        validate_category_draft(draft)?;

        self.db
            .categories()
            .update(id, draft)
            .await
            .map_err(|e| match e {
                DbError::NotFound { .. } => CatalogError::CategoryNotFound(id),
                other => other.into(),
            })
    }

    pub async fn delete_category(&self, id: i64) -> Result<(), CatalogError> {
        self.db.categories().delete(id).await.map_err(|e| match e {
            DbError::NotFound { .. } => CatalogError::CategoryNotFound(id),
            DbError::ForeignKeyViolation { .. } => {
                warn!(id, "Refusing to delete a category that still has products");
                CatalogError::InUse {
                    entity: "Category",
                    id,
                }
            }
            other => other.into(),
        })?;

        info!(id, "Category deleted");
        Ok(())
    }

    async fn ensure_category(&self, category_id: Option<i64>) -> Result<(), CatalogError> {
        match category_id {
            Some(id) => self.get_category(id).await.map(|_| ()),
            None => Ok(()),
        }
    }
}

/// Maps a product write failure, treating a foreign key violation as the
/// referenced category having vanished.
fn reference_error(err: DbError, category_id: Option<i64>) -> CatalogError {
    match (err, category_id) {
        (DbError::ForeignKeyViolation { .. }, Some(id)) => CatalogError::CategoryNotFound(id),
        (other, _) => other.into(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use kasir_core::CartLine;
    use kasir_db::DbConfig;

    use crate::checkout::CheckoutEngine;

    async fn service() -> (Database, CatalogService) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        (db.clone(), CatalogService::new(db))
    }

    fn electronics() -> CategoryDraft {
        CategoryDraft {
            name: "Electronics".into(),
            description: "Devices and gadgets".into(),
        }
    }

    fn laptop(category_id: Option<i64>) -> ProductDraft {
        ProductDraft {
            name: "Laptop".into(),
            price_cents: 99_999,
            category_id,
            stock: Some(2),
        }
    }

    #[tokio::test]
    async fn test_lookups_distinguish_not_found() {
        let (_, catalog) = service().await;

        assert!(matches!(
            catalog.get_product(1).await,
            Err(CatalogError::ProductNotFound(1))
        ));
        assert!(matches!(
            catalog.get_category(1).await,
            Err(CatalogError::CategoryNotFound(1))
        ));
    }

    #[tokio::test]
    async fn test_product_requires_existing_category() {
        let (_, catalog) = service().await;

        let err = catalog.create_product(&laptop(Some(5))).await.unwrap_err();
        assert!(matches!(err, CatalogError::CategoryNotFound(5)));
        assert!(catalog.list_products().await.unwrap().is_empty());

        let category = catalog.create_category(&electronics()).await.unwrap();
        let product = catalog.create_product(&laptop(Some(category.id))).await.unwrap();
        assert_eq!(catalog.get_product(product.id).await.unwrap().name, "Laptop");

        let err = catalog
            .update_product(product.id, &laptop(Some(category.id + 100)))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::CategoryNotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_drafts_are_rejected() {
        let (_, catalog) = service().await;

        let mut draft = laptop(None);
        draft.price_cents = -1;
        assert!(matches!(
            catalog.create_product(&draft).await,
            Err(CatalogError::Validation(_))
        ));

        let blank = CategoryDraft {
            name: "  ".into(),
            description: String::new(),
        };
        assert!(matches!(
            catalog.create_category(&blank).await,
            Err(CatalogError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_referenced_entities_are_in_use() {
        let (db, catalog) = service().await;
        let category = catalog.create_category(&electronics()).await.unwrap();
        let product = catalog.create_product(&laptop(Some(category.id))).await.unwrap();

        let err = catalog.delete_category(category.id).await.unwrap_err();
        assert!(matches!(err, CatalogError::InUse { entity: "Category", .. }));

        CheckoutEngine::new(db, true)
            .checkout(&[CartLine::new(product.id, 1)])
            .await
            .unwrap();

        let err = catalog.delete_product(product.id).await.unwrap_err();
        assert!(matches!(err, CatalogError::InUse { entity: "Product", .. }));
    }

    #[tokio::test]
    async fn test_delete_unreferenced() {
        let (_, catalog) = service().await;
        let category = catalog.create_category(&electronics()).await.unwrap();
        let product = catalog.create_product(&laptop(None)).await.unwrap();

        catalog.delete_product(product.id).await.unwrap();
        catalog.delete_category(category.id).await.unwrap();

        assert!(matches!(
            catalog.delete_category(category.id).await,
            Err(CatalogError::CategoryNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_adjust_stock() {
        let (_, catalog) = service().await;
        let tracked = catalog.create_product(&laptop(None)).await.unwrap();

        let mut gift_card = laptop(None);
        gift_card.name = "Gift card".into();
        gift_card.stock = None;
        let untracked = catalog.create_product(&gift_card).await.unwrap();

        assert_eq!(
            catalog.adjust_stock(tracked.id, 10).await.unwrap().stock,
            Some(12)
        );
        assert!(matches!(
            catalog.adjust_stock(tracked.id, -13).await,
            Err(CatalogError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(matches!(
            catalog.adjust_stock(untracked.id, 1).await,
            Err(CatalogError::Validation(ValidationError::InvalidFormat { .. }))
        ));
        assert!(matches!(
            catalog.adjust_stock(999, 1).await,
            Err(CatalogError::ProductNotFound(999))
        ));
    }

    #[tokio::test]
    async fn test_restock_overflow_leaves_product_usable() {
        let (db, catalog) = service().await;
        let mut draft = laptop(None);
        draft.stock = Some(5);
        let product = catalog.create_product(&draft).await.unwrap();

        let err = catalog.adjust_stock(product.id, i64::MAX).await.unwrap_err();
        match err {
            CatalogError::Validation(ValidationError::OutOfRange { min, max, .. }) => {
                assert_eq!(min, -5);
                assert_eq!(max, i64::MAX - 5);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert_eq!(catalog.get_product(product.id).await.unwrap().stock, Some(5));
        CheckoutEngine::new(db, true)
            .checkout(&[CartLine::new(product.id, 1)])
            .await
            .unwrap();
        assert_eq!(catalog.get_product(product.id).await.unwrap().stock, Some(4));
    }
}
