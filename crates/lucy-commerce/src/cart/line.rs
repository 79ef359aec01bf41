//! Cart line types.

use crate::catalog::{Product, ProductOption};
use crate::ids::{OptionId, ProductId};
use crate::money::{major_units, Money};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a cart line: the product plus the chosen option, if any.
///
/// Adding the same product and option twice lands on the same line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineKey {
    pub product_id: ProductId,
    pub option_id: Option<OptionId>,
}

impl LineKey {
    pub fn new(product_id: impl Into<ProductId>, option_id: Option<OptionId>) -> Self {
        Self {
            product_id: product_id.into(),
            option_id,
        }
    }

    /// Key of a product bought without an option.
    pub fn product(product_id: impl Into<ProductId>) -> Self {
        Self::new(product_id, None)
    }

    /// Key of a specific option of a product.
    pub fn option(product_id: impl Into<ProductId>, option_id: impl Into<OptionId>) -> Self {
        Self::new(product_id, Some(option_id.into()))
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.option_id {
            Some(option) => write!(f, "{}:{}", self.product_id, option),
            None => write!(f, "{}", self.product_id),
        }
    }
}

/// Frozen copy of the option chosen when a line was created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectedOption {
    #[serde(rename = "_id", alias = "id")]
    pub id: OptionId,
    pub name: String,
    #[serde(with = "major_units")]
    pub price: Money,
}

impl From<&ProductOption> for SelectedOption {
    fn from(option: &ProductOption) -> Self {
        Self {
            id: option.id.clone(),
            name: option.name.clone(),
            price: option.price,
        }
    }
}

/// A product snapshot and how many of it the shopper wants.
///
/// The product is copied when the line is created and never re-read from the
/// catalog, so a line keeps the price the shopper saw.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(flatten)]
    pub product: Product,
    /// Always at least 1 while the line exists.
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<SelectedOption>,
}

impl CartLine {
    pub(crate) fn new(product: &Product, option: Option<&ProductOption>, quantity: i64) -> Self {
        Self {
            product: product.clone(),
            quantity,
            selected_option: option.map(SelectedOption::from),
        }
    }

    /// Identity of this line.
    pub fn key(&self) -> LineKey {
        LineKey::new(
            self.product.id.clone(),
            self.selected_option.as_ref().map(|o| o.id.clone()),
        )
    }

    pub(crate) fn matches(&self, key: &LineKey) -> bool {
        self.product.id == key.product_id
            && self.selected_option.as_ref().map(|o| &o.id) == key.option_id.as_ref()
    }

    /// Display name, including the option (e.g. "Rose Oud (50ml)").
    pub fn display_name(&self) -> String {
        match &self.selected_option {
            Some(option) => format!("{} ({})", self.product.name, option.name),
            None => self.product.name.clone(),
        }
    }

    /// Price charged per unit: the option's snapshot price, else the base price.
    pub fn unit_price(&self) -> Money {
        self.selected_option
            .as_ref()
            .map_or(self.product.price, |o| o.price)
    }

    /// Unit price times quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price().times(self.quantity)
    }

    /// The option this line was created for, as listed in the product snapshot.
    pub fn snapshot_option(&self) -> Option<&ProductOption> {
        let selected = self.selected_option.as_ref()?;
        self.product.find_option(&selected.id)
    }
}
