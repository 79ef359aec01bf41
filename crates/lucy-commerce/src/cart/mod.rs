//! Shopping cart module.
//!
//! Contains cart lines and the stock-gated, persisted cart store.

mod line;
mod store;

pub use line::{CartLine, LineKey, SelectedOption};
pub use store::{CartError, CartStore, DEFAULT_CART_KEY};
