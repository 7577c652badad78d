//! # Cart Pricing
//!
//! Pure rules the Checkout Engine applies before and during a unit of work.
//!
//! ## Checkout Math
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart (ordered)            validate_cart()                              │
//! │  ─────────────────         ──────────────                               │
//! │  [ {1, qty 1},      ──►    non-empty? ≤ MAX_CART_LINES? every qty > 0?  │
//! │    {3, qty 2} ]                     │                                   │
//! │                                     ▼                                   │
//! │  Product lookups           price_line() per line, in cart order         │
//! │  (inside unit of work)     subtotal = unit price × qty  (checked)       │
//! │                                     │                                   │
//! │                                     ▼                                   │
//! │                            cart_total()  Σ subtotals     (checked)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CheckoutError;
use crate::money::Money;
use crate::types::Product;
use crate::MAX_CART_LINES;

/// One requested line of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: i64,
}

impl CartLine {
    pub const fn new(product_id: i64, quantity: i64) -> Self {
        CartLine {
            product_id,
            quantity,
        }
    }
}

/// A cart line resolved against the catalog, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub line_no: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
}

/// Validates the shape of a cart without touching the catalog.
///
/// ## Rules
/// - At least one line
/// - At most [`MAX_CART_LINES`] lines
/// - Every quantity strictly positive
///
/// The same product may appear on several lines; each line is priced and
/// persisted on its own, preserving the order the caller submitted.
///
/// ## Example
/// ```rust
/// use kasir_core::cart::{validate_cart, CartLine};
///
/// assert!(validate_cart(&[CartLine::new(1, 1)]).is_ok());
/// assert!(validate_cart(&[]).is_err());
/// assert!(validate_cart(&[CartLine::new(1, 0)]).is_err());
/// ```
pub fn validate_cart(lines: &[CartLine]) -> Result<(), CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    if lines.len() > MAX_CART_LINES {
        return Err(CheckoutError::CartTooLarge {
            max: MAX_CART_LINES,
        });
    }

    if let Some((line, bad)) = lines.iter().enumerate().find(|(_, l)| l.quantity <= 0) {
        return Err(CheckoutError::InvalidQuantity {
            line,
            quantity: bad.quantity,
        });
    }

    Ok(())
}

/// Prices one cart line against the product as currently stored.
///
/// The unit price is captured here and never re-derived afterwards.
pub fn price_line(
    line_no: usize,
    line: &CartLine,
    product: &Product,
) -> Result<PricedLine, CheckoutError> {
    let unit_price = product.price();
    let subtotal = unit_price
        .checked_mul_quantity(line.quantity)
        .ok_or(CheckoutError::AmountOverflow {
            product_id: product.id,
        })?;

    Ok(PricedLine {
        line_no: line_no as i64,
        product_id: product.id,
        product_name: product.name.clone(),
        quantity: line.quantity,
        unit_price,
        subtotal,
    })
}

/// Exact grand total of priced lines, summed in cart order.
pub fn cart_total(lines: &[PricedLine]) -> Result<Money, CheckoutError> {
    lines.iter().try_fold(Money::zero(), |acc, line| {
        acc.checked_add(line.subtotal)
            .ok_or(CheckoutError::AmountOverflow {
                product_id: line.product_id,
            })
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
