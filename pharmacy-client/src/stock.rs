//! Stock-aware quantity validation
//!
//! Advisory only: the backend owns stock. A stale-stock rejection from the
//! server is surfaced as-is and never retried.

use shared::Medicine;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("{name} is out of stock")]
    OutOfStock { name: String },

    #[error("Your cart already holds all {stock} available units of {name}")]
    MaxReached { name: String, stock: u32 },

    #[error("Quantity must be at least 1")]
    ZeroQuantity,

    #[error("Cannot update quantity. Only {stock} units available in stock.")]
    ExceedsStock { stock: u32 },
}

/// Quantity accepted for submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityCheck {
    /// Quantity to send
    pub quantity: u32,
    /// Quantity originally asked for
    pub requested: u32,
    /// True when `quantity` was lowered to fit the stock
    pub clamped: bool,
}

/// Units that can still be added on top of what the cart holds
pub fn max_addable(stock: u32, in_cart: u32) -> u32 {
    stock.saturating_sub(in_cart)
}

/// Validate an add-to-cart, clamping to the remaining stock
pub fn check_add(medicine: &Medicine, in_cart: u32, requested: u32) -> Result<QuantityCheck, StockError> {
    if requested == 0 {
        return Err(StockError::ZeroQuantity);
    }
    if medicine.is_out_of_stock() {
        return Err(StockError::OutOfStock {
            name: medicine.name.clone(),
        });
    }
    let room = max_addable(medicine.stock_quantity, in_cart);
    if room == 0 {
        return Err(StockError::MaxReached {
            name: medicine.name.clone(),
            stock: medicine.stock_quantity,
        });
    }
    let quantity = requested.min(room);
    Ok(QuantityCheck {
        quantity,
        requested,
        clamped: quantity < requested,
    })
}

/// Validate a new absolute quantity for an item already in the cart
pub fn check_update(medicine: &Medicine, quantity: u32) -> Result<QuantityCheck, StockError> {
    if quantity == 0 {
        return Err(StockError::ZeroQuantity);
    }
    if quantity > medicine.stock_quantity {
        return Err(StockError::ExceedsStock {
            stock: medicine.stock_quantity,
        });
    }
    Ok(QuantityCheck {
        quantity,
        requested: quantity,
        clamped: false,
    })
}
