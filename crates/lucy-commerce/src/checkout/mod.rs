//! Checkout module.
//!
//! Contains the checkout form, order wire types, the message and payment
//! seams, the order handoff slot, and the orchestrator tying them together.

mod customer;
mod flow;
mod handoff;
mod message;
mod order;
mod payment;
mod service;

pub use customer::{
    CheckoutForm, CustomerDetails, CustomerInfo, Delivery, DeliveryMethod, FieldError, FormError,
    FormField,
};
pub use flow::{
    CheckoutError, CheckoutOrchestrator, CheckoutOutcome, CheckoutSettings, EMPTY_CART_NOTICE,
    PAYMENT_CANCELLED_NOTICE,
};
pub use handoff::{OrderHandoff, DEFAULT_LAST_ORDER_KEY};
pub use message::{format_order_message, message_link, order_number, MessageLauncher};
pub use order::{
    CreateOrderPayload, CreateOrderResponse, Order, OrderChannel, OrderItem, OrderMetadata,
    OrderStatus, OrderSummary, VerifyPaymentResponse,
};
pub use payment::{
    generate_reference, PaymentOutcome, PaymentPopup, PaymentRequest, PaymentTransaction,
};
pub use service::{HttpOrders, OrderService};
