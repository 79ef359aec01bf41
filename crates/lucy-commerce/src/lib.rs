//! Cart, stock validation and checkout for the Lucy's Perfumery storefront.
//!
//! - **Catalog**: products with per-option price and stock, the stock
//!   validator, and the catalog service client
//! - **Cart**: a persisted cart whose every quantity increase is stock-gated
//! - **Checkout**: form validation, order placement by chat message or
//!   hosted payment, and the one-shot confirmation handoff
//!
//! # Example
//!
//! ```rust,ignore
//! use lucy_commerce::prelude::*;
//!
//! let config = StorefrontConfig::load("storefront.toml")?.with_env_overrides();
//! let cache = config.storage.open_cache()?;
//! let mut cart = CartStore::load(cache.clone(), &config.storage.cart_key);
//!
//! let catalog = HttpCatalog::from_config(&config.api);
//! let product = catalog.get(&ProductId::new("64f0c2")).await?;
//!
//! match cart.add_item(&product, 1, product.options.first().map(|o| &o.id)) {
//!     Ok(()) => println!("{} items, {}", cart.total_items(), cart.total_price()),
//!     Err(e) => println!("{e}"),
//! }
//! ```

pub mod config;
pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;

pub use config::StorefrontConfig;
pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::StorefrontConfig;
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{
        validate_stock, CatalogService, HttpCatalog, Product, ProductOption, ProductPage,
        ProductQuery, StockIssue,
    };

    // Cart
    pub use crate::cart::{CartError, CartLine, CartStore, LineKey, SelectedOption};

    // Checkout
    pub use crate::checkout::{
        CheckoutError, CheckoutForm, CheckoutOrchestrator, CheckoutOutcome, CheckoutSettings,
        CustomerInfo, DeliveryMethod, HttpOrders, MessageLauncher, OrderHandoff, OrderService,
        OrderStatus, OrderSummary, PaymentOutcome, PaymentPopup, PaymentRequest,
    };
}
