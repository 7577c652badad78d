//! # Repository Module
//!
//! Database repository implementations for Kasir POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Service call                                                          │
//! │       │                                                                 │
//! │       │  db.products().get_by_id(1)                                    │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── list(&self)                                                       │
//! │  ├── insert(&self, draft)                                              │
//! │  ├── update(&self, id, draft)                                          │
//! │  └── adjust_stock(&self, id, delta)                                    │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD and stock
//! - [`CategoryRepository`](category::CategoryRepository) - Category CRUD
//! - [`TransactionRepository`](transaction::TransactionRepository) - Read-only transaction lookup
//! - [`ReportRepository`](report::ReportRepository) - Sales aggregation
//!
//! Transactions are only ever written through
//! [`UnitOfWork`](crate::unit_of_work::UnitOfWork).

pub mod category;
pub mod product;
pub mod report;
pub mod transaction;
