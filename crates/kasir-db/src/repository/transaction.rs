//! # Transaction Repository
//!
//! Read-only access to recorded transactions. Writes go through
//! [`UnitOfWork`](crate::unit_of_work::UnitOfWork) only.

use sqlx::SqlitePool;

use crate::error::DbResult;
use kasir_core::{Transaction, TransactionLine};

/// Repository for reading transactions and their lines.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Gets a transaction with its lines in cart order.
    pub async fn get(&self, id: i64) -> DbResult<Option<Transaction>> {
        let header = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, created_at, total_amount_cents
            FROM transactions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(mut transaction) = header else {
            return Ok(None);
        };

        transaction.lines = self.get_lines(id).await?;
        Ok(Some(transaction))
    }

    /// Gets the lines of a transaction ordered by `line_no`.
    pub async fn get_lines(&self, transaction_id: i64) -> DbResult<Vec<TransactionLine>> {
        let lines = sqlx::query_as::<_, TransactionLine>(
            r#"
            SELECT id, transaction_id, line_no, product_id, product_name,
                   quantity, unit_price_cents, subtotal_cents
            FROM transaction_lines
            WHERE transaction_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Counts recorded transactions (for diagnostics and tests).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Counts recorded transaction lines across all transactions.
    pub async fn count_lines(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transaction_lines")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_missing_transaction() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.transactions();

        assert!(repo.get(1).await.unwrap().is_none());
        assert!(repo.get_lines(1).await.unwrap().is_empty());
        assert_eq!(repo.count().await.unwrap(), 0);
        assert_eq!(repo.count_lines().await.unwrap(), 0);
    }
}
