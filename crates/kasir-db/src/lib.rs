//! # kasir-db: Database Layer for Kasir POS
//!
//! This crate provides database access for the Kasir POS system.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir POS Data Flow                              │
//! │                                                                         │
//! │  CheckoutEngine / ReportingEngine (kasir-service)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kasir-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐  ┌────────────────┐  ┌──────────────────┐  │   │
//! │  │   │   Database    │  │  Repositories  │  │   UnitOfWork     │  │   │
//! │  │   │   (pool.rs)   │  │ product, categ.│  │ (checkout writes │  │   │
//! │  │   │               │  │ transaction,   │  │  in one storage  │  │   │
//! │  │   │ SqlitePool    │◄─│ report         │  │  transaction)    │  │   │
//! │  │   └───────────────┘  └────────────────┘  └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL): migrations/sqlite/*.sql embedded at compile time       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`unit_of_work`] - Atomic checkout writes
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kasir_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./kasir.db")).await?;
//!
//! let laptop = db.products().get_by_id(1).await?;
//! let mut uow = db.begin_unit_of_work().await?;
//! // ... writes ...
//! uow.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod unit_of_work;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use unit_of_work::{StockOutcome, UnitOfWork};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::product::ProductRepository;
pub use repository::report::ReportRepository;
pub use repository::transaction::TransactionRepository;
