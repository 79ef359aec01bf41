//! Customer details collected at checkout.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    /// Collected from the shop.
    Pickup,
    #[default]
    Delivery,
}

impl DeliveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMethod::Pickup => "pickup",
            DeliveryMethod::Delivery => "delivery",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DeliveryMethod::Pickup => "Shop Pickup",
            DeliveryMethod::Delivery => "Delivery",
        }
    }
}

/// Who placed the order, as sent to the order service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl CustomerInfo {
    /// First word of the name, and the rest if any.
    pub fn name_parts(&self) -> (&str, Option<&str>) {
        let name = self.name.trim();
        match name.split_once(char::is_whitespace) {
            Some((first, rest)) => (first, Some(rest.trim_start())),
            None => (name, None),
        }
    }
}

/// Raw checkout form input.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    pub name: String,
    pub phone: String,
    /// Empty is treated as absent.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub delivery_method: DeliveryMethod,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub special_instructions: Option<String>,
}

/// Validated checkout details.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerDetails {
    pub customer: CustomerInfo,
    pub delivery: Delivery,
    pub special_instructions: Option<String>,
}

/// Where the order goes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum Delivery {
    Pickup,
    Delivery { address: String, country: String },
}

impl Delivery {
    pub fn method(&self) -> DeliveryMethod {
        match self {
            Delivery::Pickup => DeliveryMethod::Pickup,
            Delivery::Delivery { .. } => DeliveryMethod::Delivery,
        }
    }
}

/// Form field a validation message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Phone,
    Email,
    Address,
    Country,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Phone => "phone",
            FormField::Email => "email",
            FormField::Address => "address",
            FormField::Country => "country",
        }
    }
}

/// A single field problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: FormField,
    pub message: &'static str,
}

/// Every problem found in a checkout form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", join_messages(.errors))]
pub struct FormError {
    pub errors: Vec<FieldError>,
}

impl FormError {
    /// The message for one field, if it failed.
    pub fn message_for(&self, field: FormField) -> Option<&'static str> {
        self.errors.iter().find(|e| e.field == field).map(|e| e.message)
    }
}

fn join_messages(errors: &[FieldError]) -> String {
    errors.iter().map(|e| e.message).collect::<Vec<_>>().join("; ")
}

const MIN_NAME_CHARS: usize = 2;
const MIN_PHONE_CHARS: usize = 5;

impl CheckoutForm {
    /// Check the form and normalize it into [`CustomerDetails`].
    ///
    /// Fields are trimmed. Address and country are only required, and only
    /// kept, for delivery orders.
    pub fn validate(&self) -> Result<CustomerDetails, FormError> {
        let mut errors = Vec::new();
        let mut fail = |field, message| errors.push(FieldError { field, message });

        let name = self.name.trim();
        if name.chars().count() < MIN_NAME_CHARS {
            fail(FormField::Name, "Name must be at least 2 characters");
        }

        let phone = self.phone.trim();
        if phone.chars().count() < MIN_PHONE_CHARS {
            fail(FormField::Phone, "Phone number is required");
        }

        let email = non_blank(&self.email);
        if email.is_some_and(|e| !is_valid_email(e)) {
            fail(FormField::Email, "Invalid email address");
        }

        let delivery = match self.delivery_method {
            DeliveryMethod::Pickup => Some(Delivery::Pickup),
            DeliveryMethod::Delivery => {
                let address = non_blank(&self.address);
                let country = non_blank(&self.country);
                if address.is_none() {
                    fail(
                        FormField::Address,
                        "Delivery address is required for delivery orders",
                    );
                }
                if country.is_none() {
                    fail(FormField::Country, "Country is required for delivery orders");
                }
                address.zip(country).map(|(address, country)| Delivery::Delivery {
                    address: address.to_string(),
                    country: country.to_string(),
                })
            }
        };

        match delivery {
            Some(delivery) if errors.is_empty() => Ok(CustomerDetails {
                customer: CustomerInfo {
                    name: name.to_string(),
                    phone: phone.to_string(),
                    email: email.map(str::to_string),
                },
                delivery,
                special_instructions: non_blank(&self.special_instructions).map(str::to_string),
            }),
            _ => Err(FormError { errors }),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// `local@domain.tld` with no whitespace and a dotted domain.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}
