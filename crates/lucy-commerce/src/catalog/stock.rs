//! Stock validation for cart mutations.
//!
//! [`validate_stock`] is a pure check: it decides whether a requested total
//! quantity of a product, or of one of its options, can be held in a cart.

use crate::catalog::{Product, ProductOption};
use thiserror::Error;

/// Why a requested quantity cannot be satisfied.
///
/// The `Display` text is shown to shoppers as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StockIssue {
    /// The product, or the chosen option, is no longer sold.
    #[error("This product is no longer available")]
    Unavailable,

    /// The product has no stock left.
    #[error("This product is out of stock")]
    OutOfStock,

    /// The chosen option has no stock left.
    #[error("The selected option \"{option}\" is out of stock")]
    OptionOutOfStock { option: String },

    /// Fewer units remain than were requested.
    #[error("Only {available} items available in stock")]
    Insufficient { available: i64 },
}

/// Check that `requested` units can be held.
///
/// When `option` is given its stock is used instead of the product's; the
/// owning product must still be active. Checks run in order: availability,
/// then empty stock, then the requested amount.
pub fn validate_stock(
    product: &Product,
    option: Option<&ProductOption>,
    requested: i64,
) -> Result<(), StockIssue> {
    if !product.is_active || option.is_some_and(|o| !o.is_active()) {
        return Err(StockIssue::Unavailable);
    }

    let available = available_stock(product, option);
    if available <= 0 {
        return Err(match option {
            Some(o) => StockIssue::OptionOutOfStock {
                option: o.name.clone(),
            },
            None => StockIssue::OutOfStock,
        });
    }

    if requested > available {
        return Err(StockIssue::Insufficient { available });
    }

    Ok(())
}

/// The stock count that bounds a cart line.
pub fn available_stock(product: &Product, option: Option<&ProductOption>) -> i64 {
    option.map_or(product.stock, |o| o.stock)
}
