//! # Domain Types
//!
//! Core domain types used throughout Kasir POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │    Category     │◄──│     Product     │◄──│  TransactionLine    │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  id             │   │  id             │   │  transaction_id(FK) │   │
//! │  │  name           │   │  name           │   │  product_id (FK)    │   │
//! │  │  description    │   │  price_cents    │   │  unit_price_cents   │   │
//! │  └─────────────────┘   │  stock (opt)    │   │  quantity, subtotal │   │
//! │                        └─────────────────┘   └──────────┬──────────┘   │
//! │                                                         │ owned by     │
//! │  ┌─────────────────┐                       ┌────────────▼──────────┐   │
//! │  │  SalesReport    │ ◄── aggregated from ──│     Transaction       │   │
//! │  │  (derived)      │                       │  id, created_at,      │   │
//! │  └─────────────────┘                       │  total_amount_cents   │   │
//! │                                            └───────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every persisted entity has a store-generated numeric `id`
//! (`INTEGER PRIMARY KEY AUTOINCREMENT`), never a process-local counter.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Category
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing a category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Store-generated identifier.
    pub id: i64,

    /// Display name, also snapshotted onto transaction lines.
    pub name: String,

    /// Unit price in minor units. Never negative.
    pub price_cents: i64,

    /// Optional category reference.
    pub category_id: Option<i64>,

    /// Current stock level. `None` means the product does not track stock.
    pub stock: Option<i64>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether stock is tracked for this product.
    #[inline]
    pub fn tracks_stock(&self) -> bool {
        self.stock.is_some()
    }
}

/// Input for creating or replacing a product.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductDraft {
    pub name: String,
    pub price_cents: i64,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub stock: Option<i64>,
}

// =============================================================================
// Transaction
// =============================================================================

/// A recorded sale. Created atomically by checkout, read-only afterwards.
///
/// ## Invariant
/// `total_amount_cents == lines.iter().map(|l| l.subtotal_cents).sum()`
/// and `lines` is never empty for a persisted transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Transaction {
    pub id: i64,

    /// Assigned inside the unit of work.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    pub total_amount_cents: i64,

    /// Lines in cart order.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub lines: Vec<TransactionLine>,
}

impl Transaction {
    /// Returns the total as Money.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    /// Sum of the line subtotals, or `None` if it overflows. Equal to
    /// [`Self::total_amount`] for any transaction read back from the store.
    pub fn lines_total(&self) -> Option<Money> {
        self.lines
            .iter()
            .try_fold(Money::zero(), |acc, line| acc.checked_add(line.subtotal()))
    }
}

/// A line item of a transaction.
///
/// Uses the snapshot pattern: name and unit price are frozen at sale time
/// and never re-derived from the product later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TransactionLine {
    pub id: i64,
    pub transaction_id: i64,
    /// Zero-based position in the submitted cart.
    pub line_no: i64,
    pub product_id: i64,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Unit price in minor units at time of sale (frozen).
    pub unit_price_cents: i64,
    /// `unit_price_cents × quantity`.
    pub subtotal_cents: i64,
}

impl TransactionLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Sales Report
// =============================================================================

/// The best-selling product of a report window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TopProduct {
    pub product_id: i64,
    pub name: String,
    pub quantity_sold: i64,
}

/// Aggregated sales over an inclusive calendar-date window.
///
/// Derived on every request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesReport {
    #[ts(as = "String")]
    pub start_date: NaiveDate,
    #[ts(as = "String")]
    pub end_date: NaiveDate,
    pub total_revenue_cents: i64,
    pub total_transaction_count: i64,
    /// Absent when the window has no sales.
    pub top_product: Option<TopProduct>,
}

impl SalesReport {
    /// An empty report for a window with no transactions.
    pub fn empty(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        SalesReport {
            start_date,
            end_date,
            total_revenue_cents: 0,
            total_transaction_count: 0,
            top_product: None,
        }
    }

    /// Returns the revenue as Money.
    #[inline]
    pub fn total_revenue(&self) -> Money {
        Money::from_cents(self.total_revenue_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(line_no: i64, quantity: i64, unit_price_cents: i64) -> TransactionLine {
        TransactionLine {
            id: line_no + 1,
            transaction_id: 1,
            line_no,
            product_id: line_no + 1,
            product_name: format!("P{line_no}"),
            quantity,
            unit_price_cents,
            subtotal_cents: unit_price_cents * quantity,
        }
    }

    #[test]
    fn test_lines_total_matches_header() {
        let tx = Transaction {
            id: 1,
            created_at: Utc::now(),
            total_amount_cents: 159_997,
            lines: vec![line(0, 1, 99_999), line(1, 2, 29_999)],
        };
        assert_eq!(tx.lines_total(), Some(tx.total_amount()));
    }

    #[test]
    fn test_lines_total_overflow_is_none() {
        let mut big = line(0, 1, i64::MAX);
        big.subtotal_cents = i64::MAX;
        let tx = Transaction {
            id: 1,
            created_at: Utc::now(),
            total_amount_cents: 0,
            lines: vec![big, line(1, 1, 1)],
        };
        assert_eq!(tx.lines_total(), None);
    }

    #[test]
    fn test_empty_report() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let report = SalesReport::empty(day, day);
        assert!(report.total_revenue().is_zero());
        assert_eq!(report.total_transaction_count, 0);
        assert!(report.top_product.is_none());
    }

    #[test]
    fn test_product_draft_defaults() {
        let draft: ProductDraft =
            serde_json::from_str(r#"{"name":"Laptop","price_cents":99999}"#).unwrap();
        assert_eq!(draft.category_id, None);
        assert_eq!(draft.stock, None);
    }
}
