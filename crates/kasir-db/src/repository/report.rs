//! # Report Repository
//!
//! Sales aggregation over a half-open timestamp window.
//!
//! ## Query Plan
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN (read)  ── one WAL snapshot for both steps                       │
//! │    │                                                                    │
//! │    ├── Step 1: transactions WHERE from <= created_at < until            │
//! │    │           SUM(total_amount_cents), COUNT(*)                        │
//! │    │                                                                    │
//! │    ├── Step 2: lines of those transactions                              │
//! │    │           GROUP BY product_id, SUM(quantity)                       │
//! │    │           ORDER BY quantity DESC, product_id ASC  LIMIT 1          │
//! │    │                                                                    │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `created_at` is stored as RFC 3339 UTC text, so string comparison
//! against UTC bounds orders the same way as the instants do.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use kasir_core::{DateRange, SalesReport, TopProduct};

/// Repository for sales report aggregation.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Aggregates every transaction with `from <= created_at < until`.
    ///
    /// `range` only labels the result; the caller derives the bounds from it
    /// in the configured time zone.
    pub async fn sales_report(
        &self,
        range: &DateRange,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> DbResult<SalesReport> {
        debug!(%from, %until, "Aggregating sales");

        let mut tx = self.pool.begin().await?;

        let (total_revenue_cents, total_transaction_count): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_amount_cents), 0), COUNT(*)
            FROM transactions
            WHERE created_at >= ?1 AND created_at < ?2
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_one(&mut *tx)
        .await?;

        let top: Option<(i64, String, i64)> = sqlx::query_as(
            r#"
            SELECT l.product_id, p.name, SUM(l.quantity) AS quantity_sold
            FROM transaction_lines l
            JOIN transactions t ON t.id = l.transaction_id
            JOIN products p ON p.id = l.product_id
            WHERE t.created_at >= ?1 AND t.created_at < ?2
            GROUP BY l.product_id
            ORDER BY quantity_sold DESC, l.product_id ASC
            LIMIT 1
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(SalesReport {
            start_date: range.start(),
            end_date: range.end(),
            total_revenue_cents,
            total_transaction_count,
            top_product: top.map(|(product_id, name, quantity_sold)| TopProduct {
                product_id,
                name,
                quantity_sold,
            }),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
