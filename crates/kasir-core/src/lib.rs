//! # kasir-core: Pure Business Logic for Kasir POS
//!
//! This crate is the **heart** of Kasir POS. It contains the checkout and
//! reporting rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 API layer (HTTP/JSON, external)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          kasir-service (Checkout, Reporting, Façade)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kasir-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  report   │  │   │
//! │  │   │  Product  │  │   Money   │  │ CartLine  │  │ DateRange │  │   │
//! │  │   │Transaction│  │           │  │  pricing  │  │  windows  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kasir-db (Database Layer)                    │   │
//! │  │         SQLite queries, migrations, repositories, unit of work  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Category, Transaction, SalesReport)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart validation and line pricing
//! - [`report`] - Calendar-date report windows
//! - [`error`] - Domain error taxonomy
//! - [`validation`] - Field validation for catalog input
//!
//! ## Example Usage
//!
//! ```rust
//! use kasir_core::money::Money;
//!
//! let laptop = Money::from_cents(99_999); // 999.99
//! let tablet = Money::from_cents(29_999); // 299.99
//!
//! let total = tablet
//!     .checked_mul_quantity(2)
//!     .and_then(|tablets| laptop.checked_add(tablets));
//! assert_eq!(total.map(|t| t.to_string()), Some("1599.97".to_string()));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{CartLine, PricedLine};
pub use error::{CatalogError, CheckoutError, ErrorClass, ReportError, ValidationError};
pub use money::Money;
pub use report::DateRange;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart.
///
/// ## Business Reason
/// Prevents runaway carts and keeps a single unit of work short, which
/// matters because every checkout holds the SQLite writer lock while it runs.
pub const MAX_CART_LINES: usize = 100;
