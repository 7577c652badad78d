//! # Validation Module
//!
//! Input validation for catalog management.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: API layer (external)                                         │
//! │  └── Type validation (deserialization)                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: kasir-service                                                │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{CategoryDraft, ProductDraft};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of product and category names.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length of a category description.
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Validates a product or category name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most [`MAX_NAME_LEN`] characters
///
/// ## Example
/// ```rust
/// use kasir_core::validation::validate_name;
///
/// assert!(validate_name("Laptop").is_ok());
/// assert!(validate_name("   ").is_err());
/// ```
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a price in minor units. Zero is allowed (free items).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an optional stock level.
pub fn validate_stock(stock: Option<i64>) -> ValidationResult<()> {
    match stock {
        Some(s) if s < 0 => Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        }),
        _ => Ok(()),
    }
}

/// Validates every field of a product draft.
///
/// The category reference is not checked here; that needs the store.
pub fn validate_product_draft(draft: &ProductDraft) -> ValidationResult<()> {
    validate_name(&draft.name)?;
    validate_price_cents(draft.price_cents)?;
    validate_stock(draft.stock)?;

    if let Some(category_id) = draft.category_id {
        if category_id <= 0 {
            return Err(ValidationError::OutOfRange {
                field: "category_id".to_string(),
                min: 1,
                max: i64::MAX,
            });
        }
    }

    Ok(())
}

/// Validates every field of a category draft.
pub fn validate_category_draft(draft: &CategoryDraft) -> ValidationResult<()> {
    validate_name(&draft.name)?;

    if draft.description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Laptop").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name(&"A".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(99_999).is_ok());
        assert!(validate_price_cents(-1).is_err());
    }

    #[test]
    fn test_validate_product_draft() {
        let mut draft = ProductDraft {
            name: "Tablet".to_string(),
            price_cents: 29_999,
            category_id: Some(1),
            stock: Some(10),
        };
        assert!(validate_product_draft(&draft).is_ok());

        draft.stock = Some(-1);
        assert!(validate_product_draft(&draft).is_err());

        draft.stock = None;
        draft.category_id = Some(0);
        assert!(validate_product_draft(&draft).is_err());
    }

    #[test]
    fn test_validate_category_draft() {
        let draft = CategoryDraft {
            name: "Electronics".to_string(),
            description: "Devices and gadgets".to_string(),
        };
        assert!(validate_category_draft(&draft).is_ok());

        let draft = CategoryDraft {
            name: "Electronics".to_string(),
            description: "x".repeat(MAX_DESCRIPTION_LEN + 1),
        };
        assert!(validate_category_draft(&draft).is_err());
    }
}
