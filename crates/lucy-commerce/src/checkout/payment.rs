//! Hosted payment popup seam.
//!
//! The popup itself is an external collaborator; this module builds what it
//! is invoked with and names its two outcomes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::checkout::{CheckoutError, CustomerInfo};
use crate::money::{Currency, Money};

/// Everything the payment popup is opened with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Amount in minor units.
    pub amount: i64,
    pub currency: Currency,
    pub email: String,
    pub reference: String,
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub phone: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub public_key: String,
}

impl PaymentRequest {
    /// Request to charge `total` to `customer`, who must have an email.
    pub fn new(
        customer: &CustomerInfo,
        email: impl Into<String>,
        total: Money,
        reference: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Self {
        let (first, last) = customer.name_parts();
        let mut metadata = serde_json::Map::new();
        metadata.insert("customer_name".into(), customer.name.clone().into());
        metadata.insert("customer_phone".into(), customer.phone.clone().into());

        Self {
            amount: total.amount_minor,
            currency: total.currency,
            email: email.into(),
            reference: reference.into(),
            first_name: first.to_string(),
            last_name: last.map(str::to_string),
            phone: customer.phone.clone(),
            metadata,
            public_key: public_key.into(),
        }
    }
}

/// What the popup reports on success.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentTransaction {
    pub reference: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// How the popup closed.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    Completed(PaymentTransaction),
    /// The shopper closed the popup without paying.
    Cancelled,
}

/// The hosted payment popup.
///
/// Implementations resolve once the popup closes. An `Err` means the popup
/// could not be shown or failed outright; a shopper closing it is
/// [`PaymentOutcome::Cancelled`].
#[async_trait]
pub trait PaymentPopup: Send + Sync {
    async fn collect(&self, request: &PaymentRequest) -> Result<PaymentOutcome, CheckoutError>;
}

const REFERENCE_SUFFIX_LEN: usize = 6;

/// A fresh payment reference: `<prefix>-<epoch millis>-<random suffix>`.
pub fn generate_reference(prefix: &str, now: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFERENCE_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{prefix}-{}-{}", now.timestamp_millis(), suffix.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> CustomerInfo {
        CustomerInfo {
            name: "Ama Serwaa Mensah".into(),
            phone: "0200000000".into(),
            email: Some("ama@example.com".into()),
        }
    }

    #[test]
    fn test_request_amount_in_minor_units() {
        let total = Money::from_major(123.456, Currency::GHS);
        let request = PaymentRequest::new(&customer(), "ama@example.com", total, "ref", "pk_test");

        assert_eq!(request.amount, 12346);
        assert_eq!(request.currency, Currency::GHS);
        assert_eq!(request.first_name, "Ama");
        assert_eq!(request.last_name.as_deref(), Some("Serwaa Mensah"));
        assert_eq!(request.metadata["customer_phone"], "0200000000");
    }

    #[test]
    fn test_request_wire_names() {
        let request = PaymentRequest::new(
            &customer(),
            "ama@example.com",
            Money::new(5000, Currency::GHS),
            "ref",
            "pk_test",
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["firstname"], "Ama");
        assert_eq!(json["publicKey"], "pk_test");
        assert_eq!(json["currency"], "GHS");
        assert_eq!(json["amount"], 5000);
    }

    #[test]
    fn test_references_are_unique_and_prefixed() {
        let now = Utc::now();
        let a = generate_reference("LP", now);
        let b = generate_reference("LP", now);

        assert!(a.starts_with(&format!("LP-{}-", now.timestamp_millis())));
        assert_eq!(a.rsplit('-').next().map(str::len), Some(REFERENCE_SUFFIX_LEN));
        assert_ne!(a, b);
    }
}
