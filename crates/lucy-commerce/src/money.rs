//! Money type for representing monetary values.
//!
//! Amounts are held in minor units (pesewas for GHS) so cart totals never
//! accumulate floating-point error. The catalog and order APIs speak decimal
//! major units; [`major_units`] converts at the serde boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    GHS,
    NGN,
    USD,
    EUR,
    GBP,
}

impl Currency {
    /// Get the currency code (e.g., "GHS").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::GHS => "GHS",
            Currency::NGN => "NGN",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
        }
    }

    /// Get the currency symbol (e.g., "GH₵").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::GHS => "GH\u{20b5}",
            Currency::NGN => "\u{20a6}",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
        }
    }

    /// Number of minor units per major unit.
    pub fn minor_per_major(&self) -> i64 {
        100
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "GHS" => Some(Currency::GHS),
            "NGN" => Some(Currency::NGN),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A monetary value with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in minor currency units.
    pub amount_minor: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from minor units.
    pub fn new(amount_minor: i64, currency: Currency) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    /// Create a Money value from a decimal major-unit amount.
    ///
    /// Rounds half away from zero, so `19.995` becomes `2000` minor units.
    ///
    /// ```
    /// use lucy_commerce::money::{Currency, Money};
    /// let price = Money::from_major(49.99, Currency::GHS);
    /// assert_eq!(price.amount_minor, 4999);
    /// ```
    pub fn from_major(amount: f64, currency: Currency) -> Self {
        let minor = (amount * currency.minor_per_major() as f64).round() as i64;
        Self::new(minor, currency)
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_minor == 0
    }

    /// Convert to a decimal major-unit value.
    pub fn to_major(&self) -> f64 {
        self.amount_minor as f64 / self.currency.minor_per_major() as f64
    }

    /// Format with the currency symbol (e.g., "GH₵49.99").
    pub fn display(&self) -> String {
        format!("{}{}", self.currency.symbol(), self.display_amount())
    }

    /// Format without symbol (e.g., "49.99").
    pub fn display_amount(&self) -> String {
        let per = self.currency.minor_per_major();
        let sign = if self.amount_minor < 0 { "-" } else { "" };
        let abs = self.amount_minor.unsigned_abs();
        format!("{sign}{}.{:02}", abs / per as u64, abs % per as u64)
    }

    /// Try to add another Money value, returning None on currency mismatch or overflow.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount_minor
            .checked_add(other.amount_minor)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Multiply by a quantity, saturating at the bounds of `i64`.
    pub fn times(&self, quantity: i64) -> Money {
        Money::new(self.amount_minor.saturating_mul(quantity), self.currency)
    }

    /// Sum Money values of one currency.
    ///
    /// Returns None if any value is in another currency or the sum overflows.
    pub fn try_sum<'a>(mut iter: impl Iterator<Item = &'a Money>, currency: Currency) -> Option<Money> {
        iter.try_fold(Money::zero(currency), |acc, m| acc.try_add(m))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Serde adapter for prices carried as decimal major units (`"price": 49.99`).
///
/// Deserialized values are in the default storefront currency.
pub mod major_units {
    use super::{Currency, Money};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(money.to_major())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Ok(Money::from_major(amount, Currency::default()))
    }
}
