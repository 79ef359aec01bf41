//! Order placement by chat message.
//!
//! The order is rendered as plain text and opened as a messaging deep link
//! (`<base>/<number>?text=<encoded message>`). Opening the link belongs to a
//! [`MessageLauncher`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lucy_data::Url;

use crate::cart::CartLine;
use crate::checkout::{CheckoutError, CustomerDetails, Delivery};
use crate::money::Money;

/// Opens a messaging deep link on the shopper's device.
#[async_trait]
pub trait MessageLauncher: Send + Sync {
    async fn open(&self, link: &Url) -> Result<(), CheckoutError>;
}

/// Order number for a message order: the prefix plus the last 8 digits of
/// the epoch milliseconds (e.g. `LP12345678`).
pub fn order_number(prefix: &str, now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().to_string();
    let tail = &millis[millis.len().saturating_sub(8)..];
    format!("{prefix}{tail}")
}

/// Render the order as a human-readable message.
pub fn format_order_message(
    store_name: &str,
    order_number: &str,
    details: &CustomerDetails,
    lines: &[CartLine],
    total: Money,
) -> String {
    let customer = &details.customer;
    let mut out = vec![
        format!("Hello {store_name}, I'd like to place an order."),
        String::new(),
        format!("Order #{order_number}"),
        String::new(),
        format!("Name: {}", customer.name),
        format!("Phone: {}", customer.phone),
    ];
    if let Some(email) = &customer.email {
        out.push(format!("Email: {email}"));
    }

    out.push(String::new());
    out.push("Items:".to_string());
    for (n, line) in lines.iter().enumerate() {
        out.push(format!(
            "{}. {} x{} @ {} = {}",
            n + 1,
            line.display_name(),
            line.quantity,
            line.unit_price(),
            line.line_total()
        ));
    }

    out.push(String::new());
    match &details.delivery {
        Delivery::Pickup => out.push(format!("Delivery: {}", details.delivery.method().display_name())),
        Delivery::Delivery { address, country } => {
            out.push(format!("Delivery: {}", details.delivery.method().display_name()));
            out.push(format!("Address: {address}"));
            out.push(format!("Country: {country}"));
        }
    }
    if let Some(notes) = &details.special_instructions {
        out.push(format!("Instructions: {notes}"));
    }

    out.push(String::new());
    out.push(format!("Total: {total}"));
    out.join("\n")
}

/// Build the deep link carrying `message`.
pub fn message_link(base_url: &str, phone_number: &str, message: &str) -> Result<Url, CheckoutError> {
    let number: String = phone_number.chars().filter(char::is_ascii_digit).collect();
    let raw = format!("{}/{}", base_url.trim_end_matches('/'), number);
    Url::parse_with_params(&raw, [("text", message)])
        .map_err(|e| CheckoutError::InvalidLink(format!("{raw}: {e}")))
}
