//! Product and option types as served by the catalog API.

use crate::ids::{OptionId, ProductId};
use crate::money::{major_units, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A perfume in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalog identifier.
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// URL slug, when the backend provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Fragrance house.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Category name (e.g. "Women", "Unisex").
    #[serde(default)]
    pub category: String,
    /// Primary image URL.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    /// Base price. Ignored for pricing when the product has options.
    #[serde(with = "major_units")]
    pub price: Money,
    /// Base stock. Ignored for stock checks when the product has options.
    #[serde(default)]
    pub stock: i64,
    /// Inactive products cannot be added to or kept growing in a cart.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Explicit marker that an option must be chosen.
    #[serde(default)]
    pub has_options: bool,
    /// Purchasable options, each with its own price and stock.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ProductOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Create an active product with no options.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money, stock: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            slug: None,
            brand: None,
            category: String::new(),
            image: String::new(),
            description: String::new(),
            price,
            stock,
            is_active: true,
            has_options: false,
            options: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Append an option and mark the product as requiring one.
    pub fn with_option(mut self, option: ProductOption) -> Self {
        self.options.push(option);
        self.has_options = true;
        self
    }

    /// Mark the product as no longer sold.
    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Whether an option must be chosen before this product can go in a cart.
    pub fn has_options(&self) -> bool {
        self.has_options || !self.options.is_empty()
    }

    /// Look up an option by ID.
    pub fn find_option(&self, id: &OptionId) -> Option<&ProductOption> {
        self.options.iter().find(|o| &o.id == id)
    }

    /// Options that are currently sold and in stock.
    pub fn available_options(&self) -> impl Iterator<Item = &ProductOption> {
        self.options.iter().filter(|o| o.is_active() && o.stock > 0)
    }

    /// The backend slug, or one derived from the name.
    pub fn slug_or_derived(&self) -> String {
        match &self.slug {
            Some(slug) if !slug.is_empty() => slug.clone(),
            _ => slugify(&self.name),
        }
    }

    /// Lowest price a shopper could pay: the cheapest option, or the base price.
    pub fn starting_price(&self) -> Money {
        self.options
            .iter()
            .map(|o| o.price)
            .min_by_key(|m| m.amount_minor)
            .unwrap_or(self.price)
    }
}

/// A purchasable variant of a product, such as a bottle size.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductOption {
    #[serde(rename = "_id", alias = "id")]
    pub id: OptionId,
    /// Display name (e.g. "50ml").
    pub name: String,
    #[serde(with = "major_units")]
    pub price: Money,
    /// Stock for this option alone.
    #[serde(default)]
    pub stock: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// Absent means active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl ProductOption {
    pub fn new(id: impl Into<OptionId>, name: impl Into<String>, price: Money, stock: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            stock,
            sku: None,
            is_active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active.unwrap_or(true)
    }
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn test_product_from_catalog_json() {
        let json = r#"{
            "_id": "p1",
            "name": "Rose Oud",
            "brand": "Maison Lucy",
            "category": "Unisex",
            "image": "https://cdn.example/rose.jpg",
            "description": "Warm rose",
            "price": 450.5,
            "stock": 7,
            "isActive": true,
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-02T10:00:00Z"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.price, Money::new(45050, Currency::GHS));
        assert_eq!(product.stock, 7);
        assert!(product.is_active);
        assert!(!product.has_options());
        assert!(product.created_at.is_some());
    }

    #[test]
    fn test_product_options_from_json() {
        let json = r#"{
            "id": "p2",
            "name": "Amber Night",
            "price": 100,
            "stock": 0,
            "isActive": true,
            "options": [
                {"_id": "s", "name": "30ml", "price": 20, "stock": 1},
                {"_id": "l", "name": "100ml", "price": 30, "stock": 0, "isActive": false}
            ]
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert!(product.has_options());
        let small = product.find_option(&OptionId::new("s")).unwrap();
        assert_eq!(small.price.amount_minor, 2000);
        assert!(small.is_active());
        assert!(!product.find_option(&OptionId::new("l")).unwrap().is_active());
        assert_eq!(product.available_options().count(), 1);
        assert_eq!(product.starting_price().amount_minor, 2000);
    }

    #[test]
    fn test_has_options_flag_without_list() {
        let mut product = Product::new("p3", "Cedar", Money::new(100, Currency::GHS), 5);
        assert!(!product.has_options());
        product.has_options = true;
        assert!(product.has_options());
    }

    #[test]
    fn test_slug_derivation() {
        let product = Product::new("p4", "Oud & Rose: Édition 2", Money::default(), 1);
        assert_eq!(product.slug_or_derived(), "oud-rose-édition-2");
    }
}
