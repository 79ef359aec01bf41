//! Catalog service client.

use async_trait::async_trait;
use lucy_data::FetchClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Product;
use crate::config::ApiConfig;
use crate::ids::ProductId;
use crate::money::Money;
use crate::CommerceError;

/// Filters for a product listing. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<String>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub in_stock: Option<bool>,
}

impl ProductQuery {
    /// A single page of the unfiltered catalog.
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn price_between(mut self, min: Option<Money>, max: Option<Money>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn in_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = Some(in_stock);
        self
    }
}

/// One page of products.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
}

fn first_page() -> u32 {
    1
}

/// Read access to the product catalog.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// List products matching `query`.
    async fn list(&self, query: &ProductQuery) -> Result<ProductPage, CommerceError>;

    /// Fetch one product with its options embedded.
    async fn get(&self, id: &ProductId) -> Result<Product, CommerceError>;

    /// All products in a category.
    async fn by_category(&self, category: &str) -> Result<Vec<Product>, CommerceError>;

    /// Category names known to the catalog.
    async fn categories(&self) -> Result<Vec<String>, CommerceError>;
}

/// [`CatalogService`] over the storefront HTTP API.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: FetchClient,
}

impl HttpCatalog {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    pub fn from_config(api: &ApiConfig) -> Self {
        Self::new(api.client())
    }
}

#[async_trait]
impl CatalogService for HttpCatalog {
    async fn list(&self, query: &ProductQuery) -> Result<ProductPage, CommerceError> {
        let request = self
            .client
            .get("/api/products")
            .query_opt("page", query.page)
            .query_opt("limit", query.limit)
            .query_opt("category", query.category.as_deref())
            .query_opt("minPrice", query.min_price.map(|m| m.display_amount()))
            .query_opt("maxPrice", query.max_price.map(|m| m.display_amount()))
            .query_opt("inStock", query.in_stock);

        let page: ProductPage = request.send().await?.error_for_status()?.json()?;
        debug!(count = page.products.len(), page = page.page, "listed products");
        Ok(page)
    }

    async fn get(&self, id: &ProductId) -> Result<Product, CommerceError> {
        let response = self
            .client
            .get(format!("/api/products/{id}"))
            .send()
            .await?;
        if response.status == 404 {
            return Err(CommerceError::ProductNotFound(id.to_string()));
        }
        Ok(response.error_for_status()?.json()?)
    }

    async fn by_category(&self, category: &str) -> Result<Vec<Product>, CommerceError> {
        let path = format!("/api/products/category/{category}");
        Ok(self.client.get(path).send().await?.error_for_status()?.json()?)
    }

    async fn categories(&self) -> Result<Vec<String>, CommerceError> {
        Ok(self
            .client
            .get("/api/products/categories/list")
            .send()
            .await?
            .error_for_status()?
            .json()?)
    }
}
