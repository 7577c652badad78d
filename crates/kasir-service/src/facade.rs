//! # Query Façade
//!
//! The operations the API layer calls. Every method returns `ApiError` on
//! failure, so no domain or database error type leaks past this point.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  API layer (HTTP, CLI)                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PosFacade                                                              │
//! │  ├── checkout(cart) ─────────────────► CheckoutEngine                   │
//! │  ├── daily_sales_report() ───────────► ReportingEngine (today)          │
//! │  ├── sales_report_by_date_range(s, e) ► ReportingEngine (parsed window) │
//! │  ├── get_product / get_category ─────► CatalogService                   │
//! │  └── health() ───────────────────────► Database                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use kasir_core::{CartLine, Category, DateRange, Product, ReportError, SalesReport, Transaction};
use kasir_db::{migrations, Database};

use crate::catalog::CatalogService;
use crate::checkout::CheckoutEngine;
use crate::config::ServiceConfig;
use crate::error::ApiError;
use crate::reporting::ReportingEngine;

/// Database health as reported by [`PosFacade::health`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    /// `"ok"` or `"unavailable"`.
    pub status: &'static str,
    pub database: bool,
    /// Migrations embedded in this build.
    pub migrations_total: usize,
    /// Migrations recorded in the store; absent when it can't be reached.
    pub migrations_applied: Option<usize>,
    pub server_time: DateTime<Utc>,
}

/// Entry point for the API layer.
#[derive(Debug, Clone)]
pub struct PosFacade {
    db: Database,
    checkout: CheckoutEngine,
    reporting: ReportingEngine,
    catalog: CatalogService,
}

impl PosFacade {
    /// Builds the façade over an open database.
    pub fn new(db: Database, config: &ServiceConfig) -> Self {
        PosFacade {
            checkout: CheckoutEngine::new(db.clone(), config.track_stock),
            reporting: ReportingEngine::new(db.clone(), config.utc_offset),
            catalog: CatalogService::new(db.clone()),
            db,
        }
    }

    /// Opens the configured database (running migrations) and builds the
    /// façade over it.
    pub async fn connect(config: &ServiceConfig) -> Result<Self, ApiError> {
        info!(path = %config.database_path.display(), "Opening database");
        let db = Database::new(config.db_config()).await?;
        Ok(PosFacade::new(db, config))
    }

    /// Replaces the engines' clock.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.checkout = self.checkout.with_clock(clock);
        self.reporting = self.reporting.with_clock(clock);
        self
    }

    /// Catalog management beyond the two lookups exposed here.
    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    /// `Checkout(cart)`
    pub async fn checkout(&self, cart: &[CartLine]) -> Result<Transaction, ApiError> {
        Ok(self.checkout.checkout(cart).await?)
    }

    /// `GetDailySalesReport()`
    pub async fn daily_sales_report(&self) -> Result<SalesReport, ApiError> {
        Ok(self.reporting.build_daily_report().await?)
    }

    /// `GetSalesReportByDateRange(start_date, end_date)`
    ///
    /// Both parameters are required; blank counts as missing.
    pub async fn sales_report_by_date_range(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<SalesReport, ApiError> {
        let start_date = required("start_date", start_date)?;
        let end_date = required("end_date", end_date)?;

        let range = DateRange::parse(start_date, end_date)?;
        Ok(self.reporting.build_report(range).await?)
    }

    /// `GetProductByID(id)`
    pub async fn get_product(&self, id: i64) -> Result<Product, ApiError> {
        Ok(self.catalog.get_product(id).await?)
    }

    /// `GetCategoryByID(id)`
    pub async fn get_category(&self, id: i64) -> Result<Category, ApiError> {
        Ok(self.catalog.get_category(id).await?)
    }

    /// Database connectivity and migration state.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let database = self.db.health_check().await;
        let (migrations_total, migrations_applied) = if database {
            let (total, applied) = migrations::migration_status(self.db.pool()).await?;
            (total, Some(applied))
        } else {
            (migrations::migration_count(), None)
        };
        debug!(database, migrations_total, ?migrations_applied, "Health checked");

        Ok(HealthStatus {
            status: if database { "ok" } else { "unavailable" },
            database,
            migrations_total,
            migrations_applied,
            server_time: Utc::now(),
        })
    }

    /// Closes the pool.
    pub async fn close(&self) {
        self.db.close().await;
    }
}

fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, ReportError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ReportError::MissingParameter { field }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
