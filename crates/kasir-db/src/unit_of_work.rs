//! # Unit of Work
//!
//! One storage transaction holding every write of a single checkout.
//!
//! ## Statement Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ├── open_transaction()  INSERT header (total 0)                      │
//! │    │                       ▲ first statement is a write: this           │
//! │    │                       │ connection now owns the writer lock,       │
//! │    │                       │ other checkouts wait (busy_timeout)        │
//! │    │                                                                    │
//! │    ├── product(id)         reads see the latest committed catalog       │
//! │    ├── take_stock(id, q)   UPDATE ... WHERE stock >= q                  │
//! │    ├── insert_line(..)     one row per cart line, line_no = cart index  │
//! │    ├── set_total(..)                                                    │
//! │    │                                                                    │
//! │  COMMIT  ──► header + lines + stock become visible together             │
//! │                                                                         │
//! │  Any error / early return / dropped future ──► ROLLBACK (on drop)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Starting with a read would give this connection a WAL read snapshot; a
//! later write after another checkout committed would then fail with
//! `SQLITE_BUSY_SNAPSHOT` instead of waiting. Writing first avoids that.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use kasir_core::{Money, PricedLine, Product, TransactionLine};

/// Result of a conditional stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockOutcome {
    /// Stock was decremented; `remaining` is the new level.
    Taken { remaining: i64 },
    /// The product tracks stock but has fewer than requested.
    Insufficient { available: i64 },
    /// The product does not track stock; nothing changed.
    NotTracked,
}

/// An open checkout transaction. Drop without [`commit`](Self::commit) to
/// roll back.
#[derive(Debug)]
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    /// Begins a new storage transaction on a pooled connection.
    pub async fn begin(pool: &SqlitePool) -> DbResult<Self> {
        let tx = pool
            .begin()
            .await
            .map_err(|e| match DbError::from(e) {
                busy @ (DbError::Busy(_) | DbError::PoolExhausted) => busy,
                other => DbError::TransactionFailed(other.to_string()),
            })?;
        Ok(UnitOfWork { tx })
    }

    /// Writes the transaction header with a zero total and returns its ID.
    ///
    /// Must be the first statement of the unit.
    pub async fn open_transaction(&mut self, created_at: DateTime<Utc>) -> DbResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO transactions (created_at, total_amount_cents)
            VALUES (?1, 0)
            "#,
        )
        .bind(created_at)
        .execute(&mut *self.tx)
        .await?;

        let id = result.last_insert_rowid();
        debug!(transaction_id = id, "Opened transaction header");
        Ok(id)
    }

    /// Reads a product as currently stored.
    pub async fn product(&mut self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price_cents, category_id, stock, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(product)
    }

    /// Decrements a tracked product's stock by `quantity` if enough remains.
    ///
    /// The comparison and the write happen in a single statement.
    pub async fn take_stock(
        &mut self,
        product_id: i64,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> DbResult<StockOutcome> {
        let remaining: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET stock = stock - ?2,
                updated_at = ?3
            WHERE id = ?1
              AND stock IS NOT NULL
              AND stock >= ?2
            RETURNING stock
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(now)
        .fetch_optional(&mut *self.tx)
        .await?;

        if let Some(remaining) = remaining {
            debug!(product_id, quantity, remaining, "Stock taken");
            return Ok(StockOutcome::Taken { remaining });
        }

        let current: Option<Option<i64>> =
            sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(&mut *self.tx)
                .await?;

        match current {
            None => Err(DbError::not_found("Product", product_id)),
            Some(None) => Ok(StockOutcome::NotTracked),
            Some(Some(available)) => Ok(StockOutcome::Insufficient { available }),
        }
    }

    /// Persists one priced line under `transaction_id`.
    pub async fn insert_line(
        &mut self,
        transaction_id: i64,
        line: &PricedLine,
    ) -> DbResult<TransactionLine> {
        let result = sqlx::query(
            r#"
            INSERT INTO transaction_lines (
                transaction_id, line_no, product_id, product_name,
                quantity, unit_price_cents, subtotal_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(transaction_id)
        .bind(line.line_no)
        .bind(line.product_id)
        .bind(&line.product_name)
        .bind(line.quantity)
        .bind(line.unit_price.cents())
        .bind(line.subtotal.cents())
        .execute(&mut *self.tx)
        .await?;

        Ok(TransactionLine {
            id: result.last_insert_rowid(),
            transaction_id,
            line_no: line.line_no,
            product_id: line.product_id,
            product_name: line.product_name.clone(),
            quantity: line.quantity,
            unit_price_cents: line.unit_price.cents(),
            subtotal_cents: line.subtotal.cents(),
        })
    }

    /// Sets the header's final total.
    pub async fn set_total(&mut self, transaction_id: i64, total: Money) -> DbResult<()> {
        let result = sqlx::query("UPDATE transactions SET total_amount_cents = ?2 WHERE id = ?1")
            .bind(transaction_id)
            .bind(total.cents())
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Transaction", transaction_id));
        }

        Ok(())
    }

    /// Makes every write of this unit visible atomically.
    pub async fn commit(self) -> DbResult<()> {
        self.tx.commit().await.map_err(|e| match DbError::from(e) {
            busy @ DbError::Busy(_) => busy,
            other => DbError::TransactionFailed(other.to_string()),
        })
    }

    /// Discards every write of this unit.
    pub async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use kasir_core::{CartLine, ProductDraft};

    async fn seeded(stock: Option<i64>) -> (Database, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .insert(&ProductDraft {
                name: "Laptop".into(),
                price_cents: 99_999,
                category_id: None,
                stock,
            })
            .await
            .unwrap();
        (db, product)
    }

    #[tokio::test]
    async fn test_commit_makes_everything_visible() {
        let (db, laptop) = seeded(Some(5)).await;
        let now = Utc::now();

        let mut uow = db.begin_unit_of_work().await.unwrap();
        let tx_id = uow.open_transaction(now).await.unwrap();
        let product = uow.product(laptop.id).await.unwrap().unwrap();
        let priced = kasir_core::cart::price_line(0, &CartLine::new(laptop.id, 2), &product).unwrap();
        assert_eq!(
            uow.take_stock(laptop.id, 2, now).await.unwrap(),
            StockOutcome::Taken { remaining: 3 }
        );
        uow.insert_line(tx_id, &priced).await.unwrap();
        uow.set_total(tx_id, priced.subtotal).await.unwrap();
        uow.commit().await.unwrap();

        let tx = db.transactions().get(tx_id).await.unwrap().unwrap();
        assert_eq!(tx.total_amount_cents, 199_998);
        assert_eq!(tx.lines.len(), 1);
        assert_eq!(db.products().get_by_id(laptop.id).await.unwrap().unwrap().stock, Some(3));
    }

    #[tokio::test]
    async fn test_drop_rolls_back() {
        let (db, laptop) = seeded(Some(5)).await;
        let now = Utc::now();

        {
            let mut uow = db.begin_unit_of_work().await.unwrap();
            uow.open_transaction(now).await.unwrap();
            uow.take_stock(laptop.id, 5, now).await.unwrap();
        }

        assert_eq!(db.transactions().count().await.unwrap(), 0);
        assert_eq!(db.products().get_by_id(laptop.id).await.unwrap().unwrap().stock, Some(5));
    }

    #[tokio::test]
    async fn test_take_stock_outcomes() {
        let (db, laptop) = seeded(Some(1)).await;
        let now = Utc::now();

        let mut uow = db.begin_unit_of_work().await.unwrap();
        uow.open_transaction(now).await.unwrap();
        assert_eq!(
            uow.take_stock(laptop.id, 2, now).await.unwrap(),
            StockOutcome::Insufficient { available: 1 }
        );
        assert!(matches!(
            uow.take_stock(404, 1, now).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
        uow.rollback().await.unwrap();

        let (db, untracked) = seeded(None).await;
        let mut uow = db.begin_unit_of_work().await.unwrap();
        uow.open_transaction(now).await.unwrap();
        assert_eq!(
            uow.take_stock(untracked.id, 100, now).await.unwrap(),
            StockOutcome::NotTracked
        );
        uow.rollback().await.unwrap();
    }
}
