//! Product catalog module.
//!
//! Contains product and option types, the stock validator, and the catalog
//! service client.

mod product;
mod service;
mod stock;

pub use product::{Product, ProductOption};
pub use service::{CatalogService, HttpCatalog, ProductPage, ProductQuery};
pub use stock::{available_stock, validate_stock, StockIssue};
