//! # kasir-service: Checkout, Reporting and the Query Façade
//!
//! Orchestration over `kasir-core` rules and `kasir-db` storage.
//!
//! ## Module Organization
//! ```text
//! kasir_service/
//! ├── lib.rs          ◄─── You are here (exports)
//! ├── checkout.rs     ◄─── Checkout Engine (cart → Transaction, atomic)
//! ├── reporting.rs    ◄─── Reporting Engine (window → SalesReport)
//! ├── catalog.rs      ◄─── Product/category management
//! ├── facade.rs       ◄─── PosFacade, the API layer's entry point
//! ├── config.rs       ◄─── KASIR_* environment configuration
//! ├── logging.rs      ◄─── tracing subscriber setup
//! ├── error.rs        ◄─── ApiError { code, message }
//! └── main.rs         ◄─── `kasir` command-line binary
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let config = ServiceConfig::load()?;
//! let pos = PosFacade::connect(&config).await?;
//!
//! let sale = pos.checkout(&[CartLine::new(1, 1), CartLine::new(3, 2)]).await?;
//! let today = pos.daily_sales_report().await?;
//! ```

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod facade;
pub mod logging;
pub mod reporting;

pub use catalog::CatalogService;
pub use checkout::CheckoutEngine;
pub use config::{ConfigError, ServiceConfig};
pub use error::{ApiError, ErrorCode};
pub use facade::{HealthStatus, PosFacade};
pub use logging::init_tracing;
pub use reporting::ReportingEngine;
