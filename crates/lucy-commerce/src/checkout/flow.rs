//! Checkout orchestration.
//!
//! Drives one of two terminal paths from a non-empty cart:
//!
//! - **Message**: render the order, open the messaging link, record the
//!   summary, clear the cart.
//! - **Payment**: open the payment popup; on success submit the order,
//!   record the summary from the backend's answer, clear the cart. A
//!   cancelled popup changes nothing.
//!
//! Any failure leaves the cart exactly as it was.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::cart::CartStore;
use crate::checkout::message::{format_order_message, message_link, order_number};
use crate::checkout::payment::generate_reference;
use crate::checkout::{
    CheckoutForm, CreateOrderPayload, FormError, MessageLauncher, OrderHandoff, OrderService,
    OrderSummary, PaymentOutcome, PaymentPopup, PaymentRequest,
};
use crate::config::StorefrontConfig;
use crate::CommerceError;

/// Shown when checkout is entered with nothing to buy.
pub const EMPTY_CART_NOTICE: &str = "Your cart is empty";

/// Shown when the shopper closes the payment popup.
pub const PAYMENT_CANCELLED_NOTICE: &str = "Payment cancelled";

/// Why a checkout attempt failed. The cart is unchanged whenever one is returned.
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// The form has invalid fields.
    #[error("{0}")]
    Form(#[from] FormError),

    /// Online payment needs an email for the receipt.
    #[error("Email is required for online payment")]
    EmailRequired,

    #[error("Could not build the message link: {0}")]
    InvalidLink(String),

    #[error("Could not open the messaging app: {0}")]
    Launch(String),

    /// The payment popup failed outright.
    #[error("Payment failed: {0}")]
    Payment(String),

    /// The order service rejected or never received the order.
    #[error(transparent)]
    Submission(#[from] CommerceError),
}

/// How a checkout attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// The order was placed; the cart is now empty.
    Confirmed(OrderSummary),
    /// The shopper backed out of payment; nothing changed.
    Cancelled { notice: &'static str },
    /// There was nothing in the cart to check out.
    RedirectedEmptyCart { notice: &'static str },
}

/// Checkout settings drawn from [`StorefrontConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSettings {
    pub store_name: String,
    pub order_prefix: String,
    pub messaging_base_url: String,
    pub messaging_number: String,
    pub payment_public_key: String,
}

impl From<&StorefrontConfig> for CheckoutSettings {
    fn from(config: &StorefrontConfig) -> Self {
        Self {
            store_name: config.store_name.clone(),
            order_prefix: config.order_prefix.clone(),
            messaging_base_url: config.messaging.base_url.clone(),
            messaging_number: config.messaging.phone_number.clone(),
            payment_public_key: config.payment.public_key.clone(),
        }
    }
}

/// Runs checkout against a cart and the external collaborators.
pub struct CheckoutOrchestrator {
    settings: CheckoutSettings,
    orders: Arc<dyn OrderService>,
    payments: Arc<dyn PaymentPopup>,
    messenger: Arc<dyn MessageLauncher>,
    handoff: OrderHandoff,
}

impl CheckoutOrchestrator {
    pub fn new(
        settings: CheckoutSettings,
        orders: Arc<dyn OrderService>,
        payments: Arc<dyn PaymentPopup>,
        messenger: Arc<dyn MessageLauncher>,
        handoff: OrderHandoff,
    ) -> Self {
        Self {
            settings,
            orders,
            payments,
            messenger,
            handoff,
        }
    }

    /// Guard for entering checkout: a redirect when the cart is empty.
    pub fn guard(&self, cart: &CartStore) -> Option<CheckoutOutcome> {
        cart.is_empty().then_some(CheckoutOutcome::RedirectedEmptyCart {
            notice: EMPTY_CART_NOTICE,
        })
    }

    /// Place the order by chat message.
    pub async fn place_message_order(
        &self,
        cart: &mut CartStore,
        form: &CheckoutForm,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        if let Some(redirect) = self.guard(cart) {
            return Ok(redirect);
        }
        let details = form.validate()?;

        let now = Utc::now();
        let number = order_number(&self.settings.order_prefix, now);
        let total = cart.total_price();
        let message = format_order_message(
            &self.settings.store_name,
            &number,
            &details,
            cart.items(),
            total,
        );
        let link = message_link(
            &self.settings.messaging_base_url,
            &self.settings.messaging_number,
            &message,
        )?;
        self.messenger.open(&link).await?;

        let summary = OrderSummary::for_message(number, &details, cart.items(), total, now);
        Ok(self.confirm(cart, summary))
    }

    /// Take payment through the popup, then submit the order.
    pub async fn pay_and_place_order(
        &self,
        cart: &mut CartStore,
        form: &CheckoutForm,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        if let Some(redirect) = self.guard(cart) {
            return Ok(redirect);
        }
        let details = form.validate()?;
        let email = details
            .customer
            .email
            .clone()
            .ok_or(CheckoutError::EmailRequired)?;

        let total = cart.total_price();
        let reference = generate_reference(&self.settings.order_prefix, Utc::now());
        let request = PaymentRequest::new(
            &details.customer,
            email,
            total,
            reference,
            self.settings.payment_public_key.clone(),
        );

        let transaction = match self.payments.collect(&request).await? {
            PaymentOutcome::Completed(transaction) => transaction,
            PaymentOutcome::Cancelled => {
                info!(reference = %request.reference, "payment cancelled");
                return Ok(CheckoutOutcome::Cancelled {
                    notice: PAYMENT_CANCELLED_NOTICE,
                });
            }
        };

        let payload = CreateOrderPayload::new(&details, cart.items(), total, transaction.reference);
        let response = match self.orders.create(&payload).await {
            Ok(response) => response,
            Err(e) => {
                warn!(reference = %payload.payment_reference, error = %e, "order submission failed");
                return Err(e.into());
            }
        };

        let summary = OrderSummary::from_order(&response.order);
        Ok(self.confirm(cart, summary))
    }

    /// Read and discard the last order summary for the confirmation view.
    pub fn take_confirmation(&self) -> Option<OrderSummary> {
        self.handoff.take()
    }

    fn confirm(&self, cart: &mut CartStore, summary: OrderSummary) -> CheckoutOutcome {
        if let Err(e) = self.handoff.write(&summary) {
            warn!(order_number = %summary.order_number, error = %e, "failed to record order summary");
        }
        cart.clear();
        info!(
            order_number = %summary.order_number,
            channel = ?summary.channel,
            total = %summary.total_amount,
            "order placed"
        );
        CheckoutOutcome::Confirmed(summary)
    }
}
