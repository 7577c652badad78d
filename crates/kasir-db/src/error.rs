//! # DbError
//!
//! Every `sqlx::Error` is turned into a [`DbError`] before it leaves this
//! crate, and every `DbError` is folded into the caller's domain error.
//!
//! ```text
//! sqlx::Error ─┬─ code 5 / 6, "database is locked" ─► Busy ──────┐
//!              ├─ PoolTimedOut ─────────────────────► PoolExhausted ┴─► ConcurrentConflict
//!              ├─ UNIQUE / FOREIGN KEY / CHECK ─────► constraint variants
//!              ├─ RowNotFound ──────────────────────► NotFound
//!              └─ anything else ────────────────────► Internal ─────────► PersistenceFailure
//! ```

use kasir_core::{CatalogError, CheckoutError, ReportError};
use thiserror::Error;

/// SQLite primary result codes we care about.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Storage failures, classified by what the caller can do about them.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate `(transaction_id, line_no)` pair
    /// - Any UNIQUE index violation
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Referencing a non-existent category or product
    /// - Deleting a row that other rows still reference
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation (negative stock, negative price, ...).
    #[error("Check constraint violation: {message}")]
    CheckViolation { message: String },

    /// Another writer holds the database lock and the busy timeout elapsed.
    ///
    /// Callers treat this as retryable; nothing was written.
    #[error("Database is busy: {0}")]
    Busy(String),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True when the failure came from lock contention rather than bad data.
    pub fn is_busy(&self) -> bool {
        matches!(self, DbError::Busy(_) | DbError::PoolExhausted)
    }
}

fn is_busy_code(code: Option<&str>) -> bool {
    code.and_then(|c| c.parse::<i32>().ok())
        .map(|c| matches!(c & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
        .unwrap_or(false)
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → BUSY/LOCKED code → DbError::Busy
///                               otherwise analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // Extended codes (e.g. 517 BUSY_SNAPSHOT) carry the primary
                // code in the low byte.
                if is_busy_code(db_err.code().as_deref()) || msg.contains("database is locked") {
                    return DbError::Busy(msg.to_string());
                }

                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

// =============================================================================
// Domain Error Mapping
// =============================================================================

impl From<DbError> for CheckoutError {
    fn from(err: DbError) -> Self {
        if err.is_busy() {
            CheckoutError::ConcurrentConflict
        } else {
            CheckoutError::PersistenceFailure(err.to_string())
        }
    }
}

impl From<DbError> for ReportError {
    fn from(err: DbError) -> Self {
        ReportError::PersistenceFailure(err.to_string())
    }
}

impl From<DbError> for CatalogError {
    fn from(err: DbError) -> Self {
        CatalogError::PersistenceFailure(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================
