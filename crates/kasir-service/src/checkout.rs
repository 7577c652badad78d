//! # Checkout Engine
//!
//! Turns a cart into a persisted Transaction, all or nothing.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout(cart)                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_cart ──── EmptyCart / CartTooLarge / InvalidQuantity          │
//! │       │             (no storage touched)                                │
//! │       ▼                                                                 │
//! │  UnitOfWork::begin                                                      │
//! │  ├── open_transaction(now)       writer lock acquired here              │
//! │  ├── for each line, in order:                                           │
//! │  │     product(id) ─────────── ProductNotFound                          │
//! │  │     price_line ──────────── AmountOverflow                           │
//! │  │     take_stock (if tracked) InsufficientStock                        │
//! │  ├── cart_total ────────────── AmountOverflow                           │
//! │  ├── insert_line × n                                                    │
//! │  ├── set_total                                                          │
//! │  └── commit ────────────────── ConcurrentConflict / PersistenceFailure  │
//! │                                                                         │
//! │  Any `?` above drops the unit of work, which rolls back.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A rejected checkout is never retried with altered data; the caller gets
//! the error and decides.

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use kasir_core::cart::{cart_total, price_line, validate_cart};
use kasir_core::{CartLine, CheckoutError, ErrorClass, Transaction};
use kasir_db::{Database, StockOutcome};

/// Checkout Engine.
#[derive(Debug, Clone)]
pub struct CheckoutEngine {
    db: Database,
    track_stock: bool,
    clock: fn() -> DateTime<Utc>,
}

impl CheckoutEngine {
    /// Creates an engine. `track_stock` turns on stock decrements for
    /// products that track stock.
    pub fn new(db: Database, track_stock: bool) -> Self {
        CheckoutEngine {
            db,
            track_stock,
            clock: Utc::now,
        }
    }

    /// Replaces the clock used to timestamp transactions.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Records a sale for `cart`.
    ///
    /// ## Returns
    /// The created transaction with its store-generated ID, timestamp,
    /// total and lines in cart order.
    pub async fn checkout(&self, cart: &[CartLine]) -> Result<Transaction, CheckoutError> {
        debug!(lines = cart.len(), "Checkout requested");

        match self.run(cart).await {
            Ok(transaction) => {
                info!(
                    transaction_id = transaction.id,
                    total = %transaction.total_amount(),
                    lines = transaction.lines.len(),
                    "Checkout committed"
                );
                Ok(transaction)
            }
            Err(err) => {
                match err.class() {
                    ErrorClass::Persistence => error!(error = %err, "Checkout failed"),
                    _ => warn!(error = %err, "Checkout rejected"),
                }
                Err(err)
            }
        }
    }

    async fn run(&self, cart: &[CartLine]) -> Result<Transaction, CheckoutError> {
        validate_cart(cart)?;

        let created_at = (self.clock)();

        let mut uow = self.db.begin_unit_of_work().await?;
        let transaction_id = uow.open_transaction(created_at).await?;

        let mut priced = Vec::with_capacity(cart.len());
        for (line_no, line) in cart.iter().enumerate() {
            let product = uow
                .product(line.product_id)
                .await?
                .ok_or(CheckoutError::ProductNotFound(line.product_id))?;

            let priced_line = price_line(line_no, line, &product)?;

            if self.track_stock && product.tracks_stock() {
                if let StockOutcome::Insufficient { available } =
                    uow.take_stock(product.id, line.quantity, created_at).await?
                {
                    return Err(CheckoutError::InsufficientStock {
                        product_id: product.id,
                        name: product.name,
                        available,
                        requested: line.quantity,
                    });
                }
            }

            priced.push(priced_line);
        }

        let total = cart_total(&priced)?;

        let mut lines = Vec::with_capacity(priced.len());
        for line in &priced {
            lines.push(uow.insert_line(transaction_id, line).await?);
        }
        uow.set_total(transaction_id, total).await?;
        uow.commit().await?;

        Ok(Transaction {
            id: transaction_id,
            created_at,
            total_amount_cents: total.cents(),
            lines,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
