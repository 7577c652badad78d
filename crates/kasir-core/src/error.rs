//! # Error Types
//!
//! Domain-specific error types for kasir-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kasir-core errors (this file)                                         │
//! │  ├── CheckoutError    - Checkout Engine failures                       │
//! │  ├── ReportError      - Reporting Engine / date window failures        │
//! │  ├── CatalogError     - Catalog lookups and mutations                  │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  kasir-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  kasir-service errors                                                  │
//! │  └── ApiError         - What the API layer sees (code + message)       │
//! │                                                                         │
//! │  Flow: sqlx::Error → DbError → {Checkout,Report,Catalog}Error → ApiError│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Classification
//! Every domain error answers [`ErrorClass`] so the boundary can decide how
//! to render it without matching on individual variants.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Error Class
// =============================================================================

/// Coarse classification shared by every domain error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Malformed input. Caller-correctable, never retried.
    Validation,
    /// A referenced entity does not exist.
    NotFound,
    /// Valid input rejected by current state (stock, contention, references).
    /// The caller may resubmit after re-reading state.
    Consistency,
    /// The store failed. The unit of work was rolled back.
    Persistence,
}

// =============================================================================
// Checkout Error
// =============================================================================

/// Checkout Engine failures.
///
/// ## Guarantee
/// Whatever the variant, no Transaction, TransactionLine or stock change
/// from the rejected checkout is visible to any reader.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// The cart exceeds [`crate::MAX_CART_LINES`].
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// A line quantity is zero or negative.
    ///
    /// `line` is the zero-based position in the submitted cart.
    #[error("Invalid quantity {quantity} on cart line {line}: must be positive")]
    InvalidQuantity { line: usize, quantity: i64 },

    /// A product_id does not resolve.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// A subtotal or the grand total does not fit in i64 minor units.
    #[error("Amount overflow while pricing product {product_id}")]
    AmountOverflow { product_id: i64 },

    /// Not enough stock for a tracked product.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout [{Laptop, qty: 5}]
    ///      │
    ///      ▼
    /// Conditional decrement: stock=3 >= 5 ? ── no
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: 1, available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Unit of work rolled back, nothing persisted
    /// ```
    #[error("Insufficient stock for {name} ({product_id}): available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        name: String,
        available: i64,
        requested: i64,
    },

    /// The store stayed busy/locked past its timeout.
    #[error("Checkout conflicted with a concurrent write, please retry")]
    ConcurrentConflict,

    /// The store is unavailable or the write failed.
    #[error("Checkout could not be persisted: {0}")]
    PersistenceFailure(String),
}

impl CheckoutError {
    /// Returns the error class.
    pub fn class(&self) -> ErrorClass {
        match self {
            CheckoutError::EmptyCart
            | CheckoutError::CartTooLarge { .. }
            | CheckoutError::InvalidQuantity { .. }
            | CheckoutError::AmountOverflow { .. } => ErrorClass::Validation,
            CheckoutError::ProductNotFound(_) => ErrorClass::NotFound,
            CheckoutError::InsufficientStock { .. } | CheckoutError::ConcurrentConflict => {
                ErrorClass::Consistency
            }
            CheckoutError::PersistenceFailure(_) => ErrorClass::Persistence,
        }
    }
}

// =============================================================================
// Report Error
// =============================================================================

/// Reporting Engine and Query Façade failures.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A date parameter was not supplied.
    #[error("{field} is required")]
    MissingParameter { field: &'static str },

    /// A date parameter is not a `YYYY-MM-DD` calendar date.
    #[error("{field} '{value}' is not a valid YYYY-MM-DD date")]
    InvalidDateFormat { field: &'static str, value: String },

    /// start_date is after end_date.
    #[error("start_date {start} is after end_date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// The window cannot be expressed as timestamps (dates at chrono's limits).
    #[error("Date window {start}..={end} is out of the supported range")]
    WindowOutOfRange { start: NaiveDate, end: NaiveDate },

    /// The store failed while aggregating.
    #[error("Report could not be read: {0}")]
    PersistenceFailure(String),
}

impl ReportError {
    /// Returns the error class.
    pub fn class(&self) -> ErrorClass {
        match self {
            ReportError::PersistenceFailure(_) => ErrorClass::Persistence,
            _ => ErrorClass::Validation,
        }
    }
}

// =============================================================================
// Catalog Error
// =============================================================================

/// Catalog Store failures.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    #[error("Category not found: {0}")]
    CategoryNotFound(i64),

    /// Deleting an entity that other rows still reference
    /// (a category with products, a product with sales).
    #[error("{entity} {id} is still referenced and cannot be deleted")]
    InUse { entity: &'static str, id: i64 },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Catalog store failure: {0}")]
    PersistenceFailure(String),
}

impl CatalogError {
    /// Returns the error class.
    pub fn class(&self) -> ErrorClass {
        match self {
            CatalogError::ProductNotFound(_) | CatalogError::CategoryNotFound(_) => {
                ErrorClass::NotFound
            }
            CatalogError::InUse { .. } => ErrorClass::Consistency,
            CatalogError::Validation(_) => ErrorClass::Validation,
            CatalogError::PersistenceFailure(_) => ErrorClass::Persistence,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any store access.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., bad amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CheckoutError::InsufficientStock {
            product_id: 1,
            name: "Laptop".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Laptop (1): available 3, requested 5"
        );

        let err = ReportError::InvalidRange {
            start: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        assert_eq!(err.to_string(), "start_date 2024-02-01 is after end_date 2024-01-01");
    }

    #[test]
    fn test_checkout_classes() {
        assert_eq!(CheckoutError::EmptyCart.class(), ErrorClass::Validation);
        assert_eq!(
            CheckoutError::InvalidQuantity { line: 0, quantity: 0 }.class(),
            ErrorClass::Validation
        );
        assert_eq!(CheckoutError::ProductNotFound(9).class(), ErrorClass::NotFound);
        assert_eq!(CheckoutError::ConcurrentConflict.class(), ErrorClass::Consistency);
        assert_eq!(
            CheckoutError::PersistenceFailure("disk I/O error".into()).class(),
            ErrorClass::Persistence
        );
    }

    #[test]
    fn test_not_found_is_distinct_from_malformed_input() {
        let missing = CatalogError::CategoryNotFound(7);
        let malformed: CatalogError = ValidationError::Required {
            field: "name".to_string(),
        }
        .into();

        assert_eq!(missing.class(), ErrorClass::NotFound);
        assert_eq!(malformed.class(), ErrorClass::Validation);
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        };
        assert_eq!(err.to_string(), "name must be at most 200 characters");
    }
}
