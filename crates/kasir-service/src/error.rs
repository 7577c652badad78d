//! # API Error Type
//!
//! Unified error type returned by the Query Façade.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Kasir POS                              │
//! │                                                                         │
//! │  Engine / catalog call                                                  │
//! │         │                                                               │
//! │         ├── CheckoutError ──┐                                           │
//! │         ├── ReportError  ───┤                                           │
//! │         ├── CatalogError ───┼──► ApiError { code, message } ──► caller  │
//! │         └── DbError ────────┘          │                                │
//! │                                        └── status_code() for HTTP       │
//! │                                                                         │
//! │  Persistence failures are logged here with their detail; the caller    │
//! │  only sees a generic message.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! ```json
//! { "code": "INSUFFICIENT_STOCK", "message": "Insufficient stock for Laptop (1): available 3, requested 5" }
//! ```

use serde::Serialize;

use kasir_core::{CatalogError, CheckoutError, ReportError};
use kasir_db::DbError;

/// API error returned from the façade.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Cart shape rejected (400)
    CartError,

    /// Insufficient stock (409)
    InsufficientStock,

    /// Lost a race for the store; safe to resubmit (409)
    Conflict,

    /// Entity still referenced (409)
    InUse,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status the API layer should answer with.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorCode::NotFound => 404,
            ErrorCode::ValidationError | ErrorCode::CartError => 400,
            ErrorCode::InsufficientStock | ErrorCode::Conflict | ErrorCode::InUse => 409,
            ErrorCode::DatabaseError | ErrorCode::Internal => 500,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> u16 {
        self.code.status_code()
    }

    fn persistence(detail: &str, public: &str) -> Self {
        tracing::error!(detail = %detail, "{}", public);
        ApiError::new(ErrorCode::DatabaseError, public)
    }
}

/// Converts checkout errors to API errors.
impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match &err {
            CheckoutError::EmptyCart
            | CheckoutError::CartTooLarge { .. }
            | CheckoutError::InvalidQuantity { .. } => {
                ApiError::new(ErrorCode::CartError, err.to_string())
            }
            CheckoutError::AmountOverflow { .. } => ApiError::validation(err.to_string()),
            CheckoutError::ProductNotFound(id) => ApiError::not_found("Product", id),
            CheckoutError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CheckoutError::ConcurrentConflict => ApiError::new(ErrorCode::Conflict, err.to_string()),
            CheckoutError::PersistenceFailure(detail) => {
                ApiError::persistence(detail, "Checkout could not be saved")
            }
        }
    }
}

/// Converts report errors to API errors.
impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match &err {
            ReportError::PersistenceFailure(detail) => {
                ApiError::persistence(detail, "Report could not be generated")
            }
            _ => ApiError::validation(err.to_string()),
        }
    }
}

/// Converts catalog errors to API errors.
impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match &err {
            CatalogError::ProductNotFound(id) => ApiError::not_found("Product", id),
            CatalogError::CategoryNotFound(id) => ApiError::not_found("Category", id),
            CatalogError::InUse { .. } => ApiError::new(ErrorCode::InUse, err.to_string()),
            CatalogError::Validation(e) => ApiError::validation(e.to_string()),
            CatalogError::PersistenceFailure(detail) => {
                ApiError::persistence(detail, "Catalog operation failed")
            }
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::Busy(_) | DbError::PoolExhausted => {
                ApiError::new(ErrorCode::Conflict, "Database is busy, please retry")
            }
            DbError::ConnectionFailed(e) => {
                ApiError::persistence(&e, "Database connection failed")
            }
            DbError::MigrationFailed(e) => ApiError::persistence(&e, "Database migration failed"),
            other => ApiError::persistence(&other.to_string(), "Database operation failed"),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_checkout_mapping() {
        let err: ApiError = CheckoutError::EmptyCart.into();
        assert_eq!(err.code, ErrorCode::CartError);
        assert_eq!(err.status_code(), 400);

        let err: ApiError = CheckoutError::ProductNotFound(42).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Product not found: 42");

        let err: ApiError = CheckoutError::ConcurrentConflict.into();
        assert_eq!(err.status_code(), 409);

        let err: ApiError = CheckoutError::PersistenceFailure("disk I/O error".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("disk"));
    }

    #[test]
    fn test_report_mapping() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let err: ApiError = ReportError::InvalidRange {
            start: day.succ_opt().unwrap(),
            end: day,
        }
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err: ApiError = ReportError::MissingParameter { field: "end_date" }.into();
        assert_eq!(err.message, "end_date is required");
    }

    #[test]
    fn test_catalog_mapping() {
        let err: ApiError = CatalogError::InUse {
            entity: "Category",
            id: 1,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InUse);

        let err: ApiError = CatalogError::CategoryNotFound(3).into();
        assert_eq!(err.message, "Category not found: 3");
    }

    #[test]
    fn test_serialization() {
        let err = ApiError::new(ErrorCode::InsufficientStock, "no stock");
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"code":"INSUFFICIENT_STOCK","message":"no stock"}"#);
    }
}
