//! Durable key-value storage for the Lucy's Perfumery storefront.
//!
//! Holds the persisted cart and the one-shot order handoff record, with
//! automatic JSON serialization over a pluggable byte [`Store`].
//!
//! # Example
//!
//! ```rust,ignore
//! use lucy_cache::Cache;
//!
//! let cache = Cache::open("/var/lib/storefront")?;
//!
//! // Store a value
//! cache.set("cart-storage", &cart)?;
//!
//! // Retrieve a value
//! let cart: Option<PersistedCart> = cache.get("cart-storage")?;
//!
//! // Read once, then delete
//! let summary: Option<OrderSummary> = cache.take("lastOrder")?;
//! ```

mod error;
mod kv;
mod store;

pub use error::CacheError;
pub use kv::Cache;
pub use store::{FileStore, MemoryStore, Store};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, Store};
}
