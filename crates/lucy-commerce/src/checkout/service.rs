//! Order service client.

use async_trait::async_trait;
use lucy_data::FetchClient;
use serde::Serialize;
use tracing::info;

use crate::checkout::{CreateOrderPayload, CreateOrderResponse, Order, VerifyPaymentResponse};
use crate::config::ApiConfig;
use crate::ids::OrderId;
use crate::CommerceError;

/// Order submission and lookup.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Submit a new order.
    async fn create(&self, payload: &CreateOrderPayload)
        -> Result<CreateOrderResponse, CommerceError>;

    /// Ask the backend to confirm a payment reference and complete its order.
    async fn verify_payment(&self, reference: &str)
        -> Result<VerifyPaymentResponse, CommerceError>;

    /// Fetch an order by ID.
    async fn get(&self, id: &OrderId) -> Result<Order, CommerceError>;
}

/// [`OrderService`] over the storefront HTTP API.
#[derive(Debug, Clone)]
pub struct HttpOrders {
    client: FetchClient,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    reference: &'a str,
}

impl HttpOrders {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    pub fn from_config(api: &ApiConfig) -> Self {
        Self::new(api.client())
    }
}

#[async_trait]
impl OrderService for HttpOrders {
    async fn create(
        &self,
        payload: &CreateOrderPayload,
    ) -> Result<CreateOrderResponse, CommerceError> {
        let response: CreateOrderResponse = self
            .client
            .post("/api/orders")
            .json(payload)?
            .send()
            .await?
            .error_for_status()?
            .json()?;
        info!(
            order_number = %response.order.order_number,
            items = payload.items.len(),
            "order created"
        );
        Ok(response)
    }

    async fn verify_payment(
        &self,
        reference: &str,
    ) -> Result<VerifyPaymentResponse, CommerceError> {
        Ok(self
            .client
            .post("/api/orders/verify")
            .json(&VerifyRequest { reference })?
            .send()
            .await?
            .error_for_status()?
            .json()?)
    }

    async fn get(&self, id: &OrderId) -> Result<Order, CommerceError> {
        let response = self.client.get(format!("/api/orders/{id}")).send().await?;
        if response.status == 404 {
            return Err(CommerceError::OrderNotFound(id.to_string()));
        }
        Ok(response.error_for_status()?.json()?)
    }
}
