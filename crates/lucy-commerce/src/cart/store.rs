//! The cart store.
//!
//! [`CartStore`] owns the shopper's cart lines, gates every quantity increase
//! through [`validate_stock`], and writes itself to a [`Cache`] slot after each
//! mutation. Persistence is best effort: a failed write is logged and the
//! in-memory change stands.
//!
//! One store is created per session and passed by `&mut` to whatever mutates
//! it, so a read-validate-write sequence can never interleave with another.

use lucy_cache::Cache;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::cart::{CartLine, LineKey};
use crate::catalog::{validate_stock, Product, StockIssue};
use crate::ids::OptionId;
use crate::money::{Currency, Money};

/// Default cache slot for the persisted cart.
pub const DEFAULT_CART_KEY: &str = "cart-storage";

/// Version written into the persisted envelope.
const STORAGE_VERSION: u32 = 0;

/// Why a cart mutation was refused. The cart is unchanged whenever one is returned.
///
/// The `Display` text is the shopper-facing message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CartError {
    /// The product has options and none was chosen.
    #[error("Please select an option")]
    OptionRequired,

    /// The chosen option is not listed on the product.
    #[error("The selected option is not available for this product")]
    UnknownOption(OptionId),

    /// Adds must be for at least one unit.
    #[error("Quantity must be at least 1")]
    InvalidQuantity(i64),

    /// No line with that identity.
    #[error("Product not found in cart")]
    NotInCart(LineKey),

    #[error(transparent)]
    Stock(#[from] StockIssue),
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    state: StateRef<'a>,
    version: u32,
}

#[derive(Serialize)]
struct StateRef<'a> {
    items: &'a [CartLine],
}

#[derive(Deserialize)]
struct Envelope {
    state: State,
}

#[derive(Deserialize)]
struct State {
    #[serde(default)]
    items: Vec<CartLine>,
}

/// A shopper's cart with stock-gated mutations and durable persistence.
#[derive(Debug)]
pub struct CartStore {
    lines: Vec<CartLine>,
    cache: Cache,
    key: String,
}

impl CartStore {
    /// Load the cart persisted under `key`, or start empty.
    ///
    /// A missing or unreadable slot yields an empty cart. Lines with a
    /// non-positive quantity, and repeats of an identity already loaded, are
    /// dropped.
    pub fn load(cache: Cache, key: impl Into<String>) -> Self {
        let key = key.into();
        let lines = match cache.get::<Envelope>(&key) {
            Ok(Some(envelope)) => sanitize(envelope.state.items),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(key = %key, error = %e, "discarding unreadable persisted cart");
                Vec::new()
            }
        };
        debug!(key = %key, lines = lines.len(), "cart loaded");

        Self {
            lines,
            cache,
            key,
        }
    }

    /// An empty cart that is never written anywhere durable.
    pub fn in_memory() -> Self {
        Self::load(Cache::in_memory(), DEFAULT_CART_KEY)
    }

    /// Currency of every total; the storefront sells in a single currency.
    pub fn currency(&self) -> Currency {
        Currency::default()
    }

    /// Add `quantity` units of a product, or of one of its options.
    ///
    /// An existing line for the same product and option grows by `quantity`;
    /// otherwise a new line snapshots the product and option. The combined
    /// quantity is validated against stock before anything changes.
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: i64,
        option_id: Option<&OptionId>,
    ) -> Result<(), CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let option = match option_id {
            Some(id) => Some(
                product
                    .find_option(id)
                    .ok_or_else(|| CartError::UnknownOption(id.clone()))?,
            ),
            None if product.has_options() => return Err(CartError::OptionRequired),
            None => None,
        };

        let key = LineKey::new(product.id.clone(), option.map(|o| o.id.clone()));
        let position = self.position(&key);
        let current = position.map_or(0, |i| self.lines[i].quantity);
        let requested = current.saturating_add(quantity);

        if let Err(issue) = validate_stock(product, option, requested) {
            warn!(line = %key, requested, reason = %issue, "add rejected");
            return Err(issue.into());
        }

        match position {
            Some(i) => self.lines[i].quantity = requested,
            None => self.lines.push(CartLine::new(product, option, quantity)),
        }
        debug!(line = %key, quantity = requested, "item added");
        self.persist();
        Ok(())
    }

    /// Remove a line. Removing an absent line is a no-op.
    pub fn remove_item(&mut self, key: &LineKey) {
        let before = self.lines.len();
        self.lines.retain(|line| !line.matches(key));
        if self.lines.len() != before {
            debug!(line = %key, "item removed");
        }
        self.persist();
    }

    /// Set a line's quantity.
    ///
    /// A quantity of zero or less removes the line. Otherwise the new quantity
    /// is validated against the line's snapshot of the product and option.
    pub fn update_quantity(&mut self, key: &LineKey, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            self.remove_item(key);
            return Ok(());
        }

        let Some(i) = self.position(key) else {
            return Err(CartError::NotInCart(key.clone()));
        };

        let line = &self.lines[i];
        let option = match &key.option_id {
            Some(id) => Some(
                line.snapshot_option()
                    .ok_or_else(|| CartError::UnknownOption(id.clone()))?,
            ),
            None => None,
        };
        if let Err(issue) = validate_stock(&line.product, option, quantity) {
            warn!(line = %key, requested = quantity, reason = %issue, "update rejected");
            return Err(issue.into());
        }

        self.lines[i].quantity = quantity;
        debug!(line = %key, quantity, "quantity updated");
        self.persist();
        Ok(())
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
        debug!("cart cleared");
        self.persist();
    }

    /// Sum of all line quantities.
    pub fn total_items(&self) -> i64 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Sum of all line totals, using option prices where an option was chosen.
    pub fn total_price(&self) -> Money {
        let amount = self
            .lines
            .iter()
            .map(|line| line.line_total().amount_minor)
            .fold(0_i64, i64::saturating_add);
        Money::new(amount, self.currency())
    }

    /// Lines in the order they were first added.
    pub fn items(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn get(&self, key: &LineKey) -> Option<&CartLine> {
        self.position(key).map(|i| &self.lines[i])
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    fn position(&self, key: &LineKey) -> Option<usize> {
        self.lines.iter().position(|line| line.matches(key))
    }

    fn persist(&self) {
        let envelope = EnvelopeRef {
            state: StateRef { items: &self.lines },
            version: STORAGE_VERSION,
        };
        if let Err(e) = self.cache.set(&self.key, &envelope) {
            warn!(key = %self.key, error = %e, "failed to persist cart");
        }
    }
}

fn sanitize(items: Vec<CartLine>) -> Vec<CartLine> {
    let mut lines: Vec<CartLine> = Vec::with_capacity(items.len());
    for line in items {
        let key = line.key();
        if line.quantity <= 0 {
            warn!(line = %key, quantity = line.quantity, "dropping persisted line without units");
        } else if lines.iter().any(|kept| kept.matches(&key)) {
            warn!(line = %key, "dropping duplicate persisted line");
        } else {
            lines.push(line);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductOption;
    use lucy_cache::{CacheError, MemoryStore, Store};

    fn ghs(minor: i64) -> Money {
        Money::new(minor, Currency::GHS)
    }

    fn rose(stock: i64) -> Product {
        Product::new("rose", "Rose Oud", ghs(1000), stock)
    }

    fn amber() -> Product {
        Product::new("amber", "Amber Night", ghs(5000), 0)
            .with_option(ProductOption::new("s", "30ml", ghs(2000), 1))
            .with_option(ProductOption::new("l", "100ml", ghs(3000), 0))
    }

    #[test]
    fn test_add_merges_same_identity() {
        let mut cart = CartStore::in_memory();
        cart.add_item(&rose(5), 1, None).unwrap();
        cart.add_item(&rose(5), 2, None).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn test_add_requires_option() {
        let mut cart = CartStore::in_memory();
        let err = cart.add_item(&amber(), 1, None).unwrap_err();

        assert_eq!(err, CartError::OptionRequired);
        assert_eq!(err.to_string(), "Please select an option");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_unknown_option() {
        let mut cart = CartStore::in_memory();
        let err = cart
            .add_item(&amber(), 1, Some(&OptionId::new("xl")))
            .unwrap_err();
        assert_eq!(err, CartError::UnknownOption(OptionId::new("xl")));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_rejects_non_positive_quantity() {
        let mut cart = CartStore::in_memory();
        assert_eq!(
            cart.add_item(&rose(5), 0, None),
            Err(CartError::InvalidQuantity(0))
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_catalog_product_from_json() {
        let product: Product = serde_json::from_str(
            r#"{"_id": "p9", "name": "Vetiver", "category": "Men", "image": "", "price": 10, "stock": 4}"#,
        )
        .unwrap();
        let mut cart = CartStore::in_memory();

        cart.add_item(&product, 2, None).unwrap();
        assert_eq!(cart.total_price(), ghs(2000));
        assert_eq!(cart.total_price().currency, cart.currency());
    }

    #[test]
    fn test_option_lines_are_distinct() {
        let product = Product::new("p", "Cedar", ghs(1000), 0)
            .with_option(ProductOption::new("a", "30ml", ghs(1000), 5))
            .with_option(ProductOption::new("b", "50ml", ghs(1500), 5));
        let mut cart = CartStore::in_memory();

        cart.add_item(&product, 1, Some(&OptionId::new("a"))).unwrap();
        cart.add_item(&product, 2, Some(&OptionId::new("b"))).unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total_price(), ghs(1000 + 3000));
    }

    #[test]
    fn test_update_missing_line() {
        let mut cart = CartStore::in_memory();
        let err = cart.update_quantity(&LineKey::product("rose"), 2).unwrap_err();
        assert_eq!(err.to_string(), "Product not found in cart");
    }

    #[test]
    fn test_update_to_zero_removes() {
        let mut cart = CartStore::in_memory();
        cart.add_item(&rose(5), 2, None).unwrap();

        assert!(cart.update_quantity(&LineKey::product("rose"), 0).is_ok());
        assert!(cart.is_empty());
        // Absent lines are fine too.
        assert!(cart.update_quantity(&LineKey::product("rose"), -1).is_ok());
    }

    #[test]
    fn test_update_validates_against_snapshot_option() {
        let mut cart = CartStore::in_memory();
        let product = Product::new("p", "Cedar", ghs(1000), 100)
            .with_option(ProductOption::new("a", "30ml", ghs(1200), 2));
        cart.add_item(&product, 1, Some(&OptionId::new("a"))).unwrap();

        let key = LineKey::option("p", "a");
        assert_eq!(
            cart.update_quantity(&key, 3),
            Err(CartError::Stock(StockIssue::Insufficient { available: 2 }))
        );
        assert_eq!(cart.get(&key).unwrap().quantity, 1);

        cart.update_quantity(&key, 2).unwrap();
        assert_eq!(cart.total_price(), ghs(2400));
    }

    #[test]
    fn test_clear_twice() {
        let mut cart = CartStore::in_memory();
        cart.add_item(&rose(5), 1, None).unwrap();
        cart.clear();
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), ghs(0));
    }

    #[test]
    fn test_persists_envelope_after_mutation() {
        let cache = Cache::in_memory();
        let mut cart = CartStore::load(cache.clone(), DEFAULT_CART_KEY);
        cart.add_item(&rose(5), 2, None).unwrap();

        let raw: serde_json::Value = cache.get(DEFAULT_CART_KEY).unwrap().unwrap();
        assert_eq!(raw["version"], 0);
        assert_eq!(raw["state"]["items"][0]["_id"], "rose");
        assert_eq!(raw["state"]["items"][0]["quantity"], 2);

        let reloaded = CartStore::load(cache, DEFAULT_CART_KEY);
        assert_eq!(reloaded.items(), cart.items());
    }

    #[test]
    fn test_corrupt_slot_loads_empty() {
        let store = MemoryStore::new();
        store.set(DEFAULT_CART_KEY, b"{not json").unwrap();
        let cart = CartStore::load(Cache::with_store(store), DEFAULT_CART_KEY);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_load_drops_bad_lines() {
        let cache = Cache::in_memory();
        let raw = serde_json::json!({
            "state": {"items": [
                {"_id": "a", "name": "A", "price": 10, "stock": 5, "isActive": true, "quantity": 0},
                {"_id": "b", "name": "B", "price": 10, "stock": 5, "isActive": true, "quantity": 2},
                {"_id": "b", "name": "B", "price": 10, "stock": 5, "isActive": true, "quantity": 1}
            ]},
            "version": 0
        });
        cache.set(DEFAULT_CART_KEY, &raw).unwrap();

        let cart = CartStore::load(cache, DEFAULT_CART_KEY);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_items(), 2);
    }

    struct FailingStore;

    impl Store for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            Ok(None)
        }
        fn set(&self, _key: &str, _value: &[u8]) -> Result<(), CacheError> {
            Err(CacheError::StoreError("disk full".into()))
        }
        fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Ok(())
        }
        fn keys(&self) -> Result<Vec<String>, CacheError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_persist_failure_keeps_change() {
        let mut cart = CartStore::load(Cache::with_store(FailingStore), DEFAULT_CART_KEY);
        cart.add_item(&rose(5), 1, None).unwrap();
        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn test_snapshot_price_survives_catalog_change() {
        let mut cart = CartStore::in_memory();
        let mut product = amber();
        cart.add_item(&product, 1, Some(&OptionId::new("s"))).unwrap();

        product.options[0].price = ghs(9900);
        assert_eq!(cart.total_price(), ghs(2000));
    }
}
