//! Checkout paths driven with in-memory collaborators.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lucy_cache::Cache;
use lucy_commerce::checkout::{
    CreateOrderPayload, CreateOrderResponse, Order, OrderChannel, OrderItem, OrderMetadata,
    PaymentTransaction, VerifyPaymentResponse, DEFAULT_LAST_ORDER_KEY, EMPTY_CART_NOTICE,
    PAYMENT_CANCELLED_NOTICE,
};
use lucy_commerce::prelude::*;
use lucy_data::Url;

#[derive(Default)]
struct RecordingLauncher {
    opened: Mutex<Vec<Url>>,
    fail: bool,
}

#[async_trait]
impl MessageLauncher for RecordingLauncher {
    async fn open(&self, link: &Url) -> Result<(), CheckoutError> {
        if self.fail {
            return Err(CheckoutError::Launch("no handler for link".into()));
        }
        self.opened.lock().unwrap().push(link.clone());
        Ok(())
    }
}

struct ScriptedPopup {
    outcome: PaymentOutcome,
    seen: Mutex<Vec<PaymentRequest>>,
}

impl ScriptedPopup {
    fn completing() -> Self {
        Self::new(PaymentOutcome::Completed(PaymentTransaction {
            reference: "T-REF-1".into(),
            status: "success".into(),
            transaction: Some("4099".into()),
            message: Some("Approved".into()),
        }))
    }

    fn new(outcome: PaymentOutcome) -> Self {
        Self {
            outcome,
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PaymentPopup for ScriptedPopup {
    async fn collect(&self, request: &PaymentRequest) -> Result<PaymentOutcome, CheckoutError> {
        self.seen.lock().unwrap().push(request.clone());
        Ok(self.outcome.clone())
    }
}

#[derive(Default)]
struct FakeOrders {
    reject: Option<String>,
    received: Mutex<Vec<CreateOrderPayload>>,
}

#[async_trait]
impl OrderService for FakeOrders {
    async fn create(
        &self,
        payload: &CreateOrderPayload,
    ) -> Result<CreateOrderResponse, CommerceError> {
        self.received.lock().unwrap().push(payload.clone());
        if let Some(message) = &self.reject {
            return Err(CommerceError::Api {
                status: Some(400),
                message: message.clone(),
            });
        }
        Ok(CreateOrderResponse {
            order: Order {
                id: OrderId::new("o-1"),
                order_number: "ORD-0001".into(),
                customer: payload.customer.clone(),
                items: payload.items.clone(),
                total_amount: payload.total_amount,
                currency: Currency::GHS,
                status: OrderStatus::Completed,
                payment_reference: payload.payment_reference.clone(),
                metadata: payload.metadata.clone(),
                created_at: None,
                updated_at: None,
            },
            payment_reference: Some(payload.payment_reference.clone()),
        })
    }

    async fn verify_payment(
        &self,
        _reference: &str,
    ) -> Result<VerifyPaymentResponse, CommerceError> {
        unimplemented!("checkout does not verify payments")
    }

    async fn get(&self, id: &OrderId) -> Result<Order, CommerceError> {
        Err(CommerceError::OrderNotFound(id.to_string()))
    }
}

struct Harness {
    cache: Cache,
    cart: CartStore,
    orders: Arc<FakeOrders>,
    popup: Arc<ScriptedPopup>,
    launcher: Arc<RecordingLauncher>,
    checkout: CheckoutOrchestrator,
}

fn harness(orders: FakeOrders, popup: ScriptedPopup, launcher: RecordingLauncher) -> Harness {
    let mut config = StorefrontConfig::default();
    config.messaging.phone_number = "233200000000".into();
    config.payment.public_key = "pk_test_abc".into();

    let cache = Cache::in_memory();
    let mut cart = CartStore::load(cache.clone(), &config.storage.cart_key);
    let rose = Product::new("p1", "Rose Oud", Money::new(1000, Currency::GHS), 5);
    let amber = Product::new("p2", "Amber Night", Money::new(0, Currency::GHS), 0)
        .with_option(ProductOption::new("s", "30ml", Money::new(2000, Currency::GHS), 2));
    cart.add_item(&rose, 2, None).unwrap();
    cart.add_item(&amber, 1, Some(&OptionId::new("s"))).unwrap();

    let orders = Arc::new(orders);
    let popup = Arc::new(popup);
    let launcher = Arc::new(launcher);
    let checkout = CheckoutOrchestrator::new(
        CheckoutSettings::from(&config),
        orders.clone(),
        popup.clone(),
        launcher.clone(),
        OrderHandoff::new(cache.clone(), DEFAULT_LAST_ORDER_KEY),
    );

    Harness {
        cache,
        cart,
        orders,
        popup,
        launcher,
        checkout,
    }
}

fn default_harness() -> Harness {
    harness(
        FakeOrders::default(),
        ScriptedPopup::completing(),
        RecordingLauncher::default(),
    )
}

fn form() -> CheckoutForm {
    CheckoutForm {
        name: "Ama Mensah".into(),
        phone: "0200000000".into(),
        email: Some("ama@example.com".into()),
        delivery_method: DeliveryMethod::Delivery,
        address: Some("12 Ring Road, Accra".into()),
        country: Some("Ghana".into()),
        special_instructions: None,
    }
}

#[tokio::test]
async fn message_order_clears_cart_and_hands_off_summary() {
    let mut h = default_harness();

    let outcome = h
        .checkout
        .place_message_order(&mut h.cart, &form())
        .await
        .unwrap();

    let summary = match outcome {
        CheckoutOutcome::Confirmed(summary) => summary,
        other => panic!("expected confirmation, got {other:?}"),
    };
    assert!(summary.order_number.starts_with("LP"));
    assert_eq!(summary.order_number.len(), 10);
    assert_eq!(summary.channel, OrderChannel::Message);
    assert_eq!(summary.total_amount, Money::new(4000, Currency::GHS));
    assert_eq!(summary.items.len(), 2);
    assert!(h.cart.is_empty());

    let opened = h.launcher.opened.lock().unwrap();
    assert_eq!(opened.len(), 1);
    assert_eq!(opened[0].path(), "/233200000000");
    let text: String = opened[0]
        .query_pairs()
        .find(|(k, _)| k == "text")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    assert!(text.contains(&format!("Order #{}", summary.order_number)));
    assert!(text.contains("Amber Night (30ml) x1"));

    assert_eq!(h.checkout.take_confirmation(), Some(summary));
    assert_eq!(h.checkout.take_confirmation(), None);
}

#[tokio::test]
async fn failed_launch_leaves_cart_untouched() {
    let mut h = harness(
        FakeOrders::default(),
        ScriptedPopup::completing(),
        RecordingLauncher {
            fail: true,
            ..RecordingLauncher::default()
        },
    );

    let err = h
        .checkout
        .place_message_order(&mut h.cart, &form())
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::Launch(_)));
    assert_eq!(h.cart.total_items(), 3);
    assert!(!h.cache.exists(DEFAULT_LAST_ORDER_KEY).unwrap());
}

#[tokio::test]
async fn payment_success_submits_order() {
    let mut h = default_harness();

    let outcome = h
        .checkout
        .pay_and_place_order(&mut h.cart, &form())
        .await
        .unwrap();

    let summary = match outcome {
        CheckoutOutcome::Confirmed(summary) => summary,
        other => panic!("expected confirmation, got {other:?}"),
    };
    assert_eq!(summary.order_number, "ORD-0001");
    assert_eq!(summary.status, OrderStatus::Completed);
    assert_eq!(summary.payment_reference.as_deref(), Some("T-REF-1"));
    assert!(h.cart.is_empty());

    let requests = h.popup.seen.lock().unwrap();
    assert_eq!(requests[0].amount, 4000);
    assert_eq!(requests[0].email, "ama@example.com");
    assert_eq!(requests[0].public_key, "pk_test_abc");
    assert!(requests[0].reference.starts_with("LP-"));

    let received = h.orders.received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].payment_reference, "T-REF-1");
    let charged: Vec<(String, i64)> = received[0]
        .items
        .iter()
        .map(|item: &OrderItem| (item.name.clone(), item.price.amount_minor))
        .collect();
    assert_eq!(
        charged,
        vec![("Rose Oud".to_string(), 1000), ("Amber Night".to_string(), 2000)]
    );
    assert_eq!(
        received[0].metadata,
        OrderMetadata {
            delivery_method: Some(DeliveryMethod::Delivery),
            delivery_address: Some("12 Ring Road, Accra".into()),
            country: Some("Ghana".into()),
            ..OrderMetadata::default()
        }
    );

    assert!(h.checkout.take_confirmation().is_some());
}

#[tokio::test]
async fn cancelled_payment_changes_nothing() {
    let mut h = harness(
        FakeOrders::default(),
        ScriptedPopup::new(PaymentOutcome::Cancelled),
        RecordingLauncher::default(),
    );
    let before = h.cart.items().to_vec();

    let outcome = h
        .checkout
        .pay_and_place_order(&mut h.cart, &form())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        CheckoutOutcome::Cancelled {
            notice: PAYMENT_CANCELLED_NOTICE
        }
    );
    assert_eq!(h.cart.items(), before.as_slice());
    assert!(h.orders.received.lock().unwrap().is_empty());
    assert_eq!(h.checkout.take_confirmation(), None);
}

#[tokio::test]
async fn rejected_submission_keeps_cart() {
    let mut h = harness(
        FakeOrders {
            reject: Some("Insufficient stock for Rose Oud".into()),
            ..FakeOrders::default()
        },
        ScriptedPopup::completing(),
        RecordingLauncher::default(),
    );

    let err = h
        .checkout
        .pay_and_place_order(&mut h.cart, &form())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Insufficient stock for Rose Oud");
    assert_eq!(h.cart.total_items(), 3);
    assert_eq!(h.checkout.take_confirmation(), None);
}

#[tokio::test]
async fn payment_requires_email() {
    let mut h = default_harness();
    let mut input = form();
    input.email = None;

    let err = h
        .checkout
        .pay_and_place_order(&mut h.cart, &input)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::EmailRequired));
    assert!(h.popup.seen.lock().unwrap().is_empty());
    assert_eq!(h.cart.total_items(), 3);
}

#[tokio::test]
async fn invalid_form_is_rejected_before_any_side_effect() {
    let mut h = default_harness();
    let mut input = form();
    input.address = None;

    let err = h
        .checkout
        .place_message_order(&mut h.cart, &input)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Delivery address is required for delivery orders"
    );
    assert!(h.launcher.opened.lock().unwrap().is_empty());
    assert_eq!(h.cart.total_items(), 3);
}

#[tokio::test]
async fn empty_cart_redirects() {
    let mut h = default_harness();
    h.cart.clear();

    let redirect = CheckoutOutcome::RedirectedEmptyCart {
        notice: EMPTY_CART_NOTICE,
    };
    assert_eq!(h.checkout.guard(&h.cart), Some(redirect.clone()));
    assert_eq!(
        h.checkout
            .place_message_order(&mut h.cart, &form())
            .await
            .unwrap(),
        redirect
    );
    assert_eq!(
        h.checkout
            .pay_and_place_order(&mut h.cart, &form())
            .await
            .unwrap(),
        redirect
    );
    assert!(h.launcher.opened.lock().unwrap().is_empty());
    assert!(h.popup.seen.lock().unwrap().is_empty());
}
