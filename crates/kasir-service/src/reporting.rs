//! # Reporting Engine
//!
//! Aggregates committed transactions over a calendar-date window.
//!
//! ## Window Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DateRange [2024-01-01, 2024-01-01]     store offset +07:00             │
//! │                                                                         │
//! │  from  = 2024-01-01T00:00+07:00  =  2023-12-31T17:00Z   (inclusive)     │
//! │  until = 2024-01-02T00:00+07:00  =  2024-01-01T17:00Z   (exclusive)     │
//! │                                                                         │
//! │  SUM / COUNT / top seller over  from <= created_at < until              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reports are computed on demand and never persisted; two builds with no
//! checkout in between return identical results.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use tracing::{debug, error, info};

use kasir_core::report::local_date;
use kasir_core::{DateRange, ErrorClass, ReportError, SalesReport};
use kasir_db::Database;

/// Reporting Engine.
#[derive(Debug, Clone)]
pub struct ReportingEngine {
    db: Database,
    offset: FixedOffset,
    clock: fn() -> DateTime<Utc>,
}

impl ReportingEngine {
    /// Creates an engine that reads calendar dates in `offset`.
    pub fn new(db: Database, offset: FixedOffset) -> Self {
        ReportingEngine {
            db,
            offset,
            clock: Utc::now,
        }
    }

    /// An engine on UTC calendar dates.
    pub fn utc(db: Database) -> Self {
        ReportingEngine::new(db, Utc.fix())
    }

    /// Replaces the clock used to decide what "today" is.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Today's calendar date in the store's offset.
    pub fn today(&self) -> NaiveDate {
        local_date((self.clock)(), self.offset)
    }

    /// Builds the report for every transaction whose local date falls in
    /// `range` (both ends inclusive).
    pub async fn build_report(&self, range: DateRange) -> Result<SalesReport, ReportError> {
        let (from, until) = range.utc_bounds(self.offset)?;
        debug!(start = %range.start(), end = %range.end(), %from, %until, "Building sales report");

        let report = self
            .db
            .reports()
            .sales_report(&range, from, until)
            .await
            .map_err(ReportError::from)
            .inspect_err(|err| {
                if err.class() == ErrorClass::Persistence {
                    error!(error = %err, "Sales report failed");
                }
            })?;

        info!(
            start = %report.start_date,
            end = %report.end_date,
            revenue = %report.total_revenue(),
            transactions = report.total_transaction_count,
            "Sales report built"
        );
        Ok(report)
    }

    /// Builds the report for today.
    pub async fn build_daily_report(&self) -> Result<SalesReport, ReportError> {
        self.build_report(DateRange::single_day(self.today())).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use kasir_core::{CartLine, Product, ProductDraft};
    use kasir_db::DbConfig;

    use crate::checkout::CheckoutEngine;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn product(db: &Database, name: &str, price_cents: i64) -> Product {
        db.products()
            .insert(&ProductDraft {
                name: name.into(),
                price_cents,
                category_id: None,
                stock: None,
            })
            .await
            .unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2024-01-01 23:30 UTC, which is already 2024-01-02 at +07:00
    fn late_new_year() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 23, 30, 0).unwrap()
    }

    #[test]
    fn test_invalid_range_is_rejected_before_any_query() {
        assert!(matches!(
            DateRange::parse("2024-01-02", "2024-01-01"),
            Err(ReportError::InvalidRange { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_day() {
        let engine = ReportingEngine::utc(db().await);

        let report = engine
            .build_report(DateRange::single_day(day(2024, 1, 1)))
            .await
            .unwrap();
        assert_eq!(report, SalesReport::empty(day(2024, 1, 1), day(2024, 1, 1)));
    }

    #[tokio::test]
    async fn test_report_is_repeatable() {
        let db = db().await;
        let laptop = product(&db, "Laptop", 99_999).await;
        CheckoutEngine::new(db.clone(), true)
            .with_clock(late_new_year)
            .checkout(&[CartLine::new(laptop.id, 2)])
            .await
            .unwrap();

        let engine = ReportingEngine::utc(db);
        let range = DateRange::single_day(day(2024, 1, 1));
        let first = engine.build_report(range).await.unwrap();
        let second = engine.build_report(range).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.total_revenue_cents, 199_998);
        assert_eq!(first.total_transaction_count, 1);
        assert_eq!(first.top_product.unwrap().quantity_sold, 2);
    }

    #[tokio::test]
    async fn test_offset_moves_day_boundary() {
        let db = db().await;
        let laptop = product(&db, "Laptop", 99_999).await;
        CheckoutEngine::new(db.clone(), true)
            .with_clock(late_new_year)
            .checkout(&[CartLine::new(laptop.id, 1)])
            .await
            .unwrap();

        let jakarta = FixedOffset::east_opt(7 * 3600).unwrap();
        let engine = ReportingEngine::new(db, jakarta);

        let new_year = engine
            .build_report(DateRange::single_day(day(2024, 1, 1)))
            .await
            .unwrap();
        assert_eq!(new_year.total_transaction_count, 0);

        let next_day = engine
            .build_report(DateRange::single_day(day(2024, 1, 2)))
            .await
            .unwrap();
        assert_eq!(next_day.total_transaction_count, 1);
        assert_eq!(next_day.total_revenue_cents, 99_999);
    }

    #[tokio::test]
    async fn test_daily_report_uses_clock() {
        let db = db().await;
        let laptop = product(&db, "Laptop", 99_999).await;
        CheckoutEngine::new(db.clone(), true)
            .with_clock(late_new_year)
            .checkout(&[CartLine::new(laptop.id, 1)])
            .await
            .unwrap();

        let engine = ReportingEngine::utc(db).with_clock(late_new_year);
        assert_eq!(engine.today(), day(2024, 1, 1));

        let report = engine.build_daily_report().await.unwrap();
        assert_eq!(report.start_date, day(2024, 1, 1));
        assert_eq!(report.end_date, day(2024, 1, 1));
        assert_eq!(report.total_transaction_count, 1);
    }

    #[tokio::test]
    async fn test_multi_day_window_is_inclusive() {
        fn jan_first() -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        }
        fn jan_third() -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 1, 3, 23, 59, 59).unwrap()
        }
        fn jan_fourth() -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 1, 4, 0, 0, 0).unwrap()
        }

        let db = db().await;
        let tablet = product(&db, "Tablet", 29_999).await;
        for clock in [jan_first as fn() -> DateTime<Utc>, jan_third, jan_fourth] {
            CheckoutEngine::new(db.clone(), true)
                .with_clock(clock)
                .checkout(&[CartLine::new(tablet.id, 1)])
                .await
                .unwrap();
        }

        let report = ReportingEngine::utc(db)
            .build_report(DateRange::parse("2024-01-01", "2024-01-03").unwrap())
            .await
            .unwrap();
        assert_eq!(report.total_transaction_count, 2);
        assert_eq!(report.total_revenue_cents, 59_998);
    }
}
