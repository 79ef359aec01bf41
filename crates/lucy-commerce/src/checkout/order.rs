//! Order types exchanged with the order service, and the confirmation summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::{CartLine, SelectedOption};
use crate::checkout::{CustomerDetails, CustomerInfo, Delivery, DeliveryMethod};
use crate::ids::{OrderId, ProductId};
use crate::money::{major_units, Currency, Money};

/// Order status as tracked by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created, awaiting payment or confirmation.
    #[default]
    Pending,
    Completed,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Failed => "failed",
        }
    }
}

/// One purchased line, at the unit price actually charged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: i64,
    /// Unit price.
    #[serde(with = "major_units")]
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<SelectedOption>,
}

impl OrderItem {
    pub fn line_total(&self) -> Money {
        self.price.times(self.quantity)
    }
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product.id.clone(),
            name: line.product.name.clone(),
            quantity: line.quantity,
            price: line.unit_price(),
            selected_option: line.selected_option.clone(),
        }
    }
}

/// Delivery details and anything else attached to an order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_method: Option<DeliveryMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl From<&CustomerDetails> for OrderMetadata {
    fn from(details: &CustomerDetails) -> Self {
        let (address, country) = match &details.delivery {
            Delivery::Pickup => (None, None),
            Delivery::Delivery { address, country } => {
                (Some(address.clone()), Some(country.clone()))
            }
        };
        Self {
            delivery_method: Some(details.delivery.method()),
            delivery_address: address,
            country,
            special_instructions: details.special_instructions.clone(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    pub customer: CustomerInfo,
    pub items: Vec<OrderItem>,
    #[serde(with = "major_units")]
    pub total_amount: Money,
    #[serde(alias = "paystackReference")]
    pub payment_reference: String,
    pub metadata: OrderMetadata,
}

impl CreateOrderPayload {
    /// Build the payload for the current cart contents.
    pub fn new(
        details: &CustomerDetails,
        lines: &[CartLine],
        total_amount: Money,
        payment_reference: impl Into<String>,
    ) -> Self {
        Self {
            customer: details.customer.clone(),
            items: lines.iter().map(OrderItem::from).collect(),
            total_amount,
            payment_reference: payment_reference.into(),
            metadata: OrderMetadata::from(details),
        }
    }
}

/// An order as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: OrderId,
    pub order_number: String,
    pub customer: CustomerInfo,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(with = "major_units")]
    pub total_amount: Money,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, alias = "paystackReference")]
    pub payment_reference: String,
    #[serde(default)]
    pub metadata: OrderMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Response of `POST /api/orders`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order: Order,
    #[serde(default, alias = "paystackReference", skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
}

/// Response of `POST /api/orders/verify`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub order: Option<Order>,
}

/// How an order was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderChannel {
    /// Sent as a chat message; payment is arranged in the conversation.
    Message,
    /// Paid through the hosted payment popup.
    Payment,
}

/// What the confirmation view shows, handed off once after checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub order_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    pub channel: OrderChannel,
    pub status: OrderStatus,
    pub customer: CustomerInfo,
    #[serde(default)]
    pub metadata: OrderMetadata,
    pub items: Vec<OrderItem>,
    #[serde(with = "major_units")]
    pub total_amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
    pub placed_at: DateTime<Utc>,
}

impl OrderSummary {
    /// Summary of an order placed by message, built from the cart.
    pub fn for_message(
        order_number: impl Into<String>,
        details: &CustomerDetails,
        lines: &[CartLine],
        total_amount: Money,
        placed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            order_number: order_number.into(),
            order_id: None,
            channel: OrderChannel::Message,
            status: OrderStatus::Pending,
            customer: details.customer.clone(),
            metadata: OrderMetadata::from(details),
            items: lines.iter().map(OrderItem::from).collect(),
            total_amount,
            payment_reference: None,
            placed_at,
        }
    }

    /// Summary of an order the backend accepted.
    pub fn from_order(order: &Order) -> Self {
        Self {
            order_number: order.order_number.clone(),
            order_id: Some(order.id.clone()),
            channel: OrderChannel::Payment,
            status: order.status,
            customer: order.customer.clone(),
            metadata: order.metadata.clone(),
            items: order.items.clone(),
            total_amount: order.total_amount,
            payment_reference: Some(order.payment_reference.clone())
                .filter(|reference| !reference.is_empty()),
            placed_at: order.created_at.unwrap_or_else(Utc::now),
        }
    }
}
