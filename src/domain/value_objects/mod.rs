//! Value objects shared across the catalog and order pipeline.

use crate::error::Error;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// SKU (Stock Keeping Unit) value object
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sku(String);

impl Sku {
    pub fn new(value: impl Into<String>) -> Result<Self, Error> {
        let value = value.into().trim().to_uppercase();
        if value.is_empty() {
            return Err(Error::Validation("sku must not be empty".into()));
        }
        if value.len() > 50 {
            return Err(Error::Validation("sku exceeds 50 characters".into()));
        }
        Ok(Self(value))
    }

    pub fn generate() -> Self {
        Self(format!("SKU-{:08}", rand::random::<u32>() % 100_000_000))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Six-digit delivery pincode.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pincode(String);

impl Pincode {
    pub fn new(value: impl Into<String>) -> Result<Self, Error> {
        let value = value.into().trim().to_string();
        if value.len() != 6 || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::Validation(format!("'{value}' is not a 6-digit pincode")));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Money value object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self {
        Self { amount, currency: currency.to_string() }
    }

    pub fn inr(amount: Decimal) -> Self {
        Self::new(amount, "INR")
    }

    pub fn zero(currency: &str) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch);
        }
        Ok(Money::new(self.amount + other.amount, &self.currency))
    }

    pub fn multiply(&self, qty: u32) -> Money {
        Money::new(self.amount * Decimal::from(qty), &self.currency)
    }

    /// `rate` is a percentage; the result is rounded to two decimal places.
    pub fn percent(&self, rate: Decimal) -> Money {
        let amount = (self.amount * rate / Decimal::from(100)).round_dp(2);
        Money::new(amount, &self.currency)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero("INR")
    }
}

#[derive(Debug, Clone)]
pub enum MoneyError {
    CurrencyMismatch,
}

impl std::error::Error for MoneyError {}

impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "currency mismatch")
    }
}

impl From<MoneyError> for Error {
    fn from(e: MoneyError) -> Self {
        Error::Validation(e.to_string())
    }
}

/// Quantity value object
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn add(&self, other: u32) -> Self {
        Self(self.0.saturating_add(other))
    }

    pub fn subtract(&self, other: u32) -> Option<Self> {
        if other > self.0 {
            None
        } else {
            Some(Self(self.0 - other))
        }
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sku() {
        let sku = Sku::new("hex-m8-001").unwrap();
        assert_eq!(sku.as_str(), "HEX-M8-001");
        assert!(Sku::new("  ").is_err());
    }

    #[test]
    fn test_pincode() {
        assert!(Pincode::new("400001").is_ok());
        assert!(Pincode::new("4000").is_err());
        assert!(Pincode::new("40000a").is_err());
    }

    #[test]
    fn test_money_add() {
        let a = Money::inr(Decimal::new(100, 0));
        let b = Money::inr(Decimal::new(50, 0));
        assert_eq!(a.add(&b).unwrap().amount(), Decimal::new(150, 0));
        assert!(a.add(&Money::new(Decimal::ONE, "USD")).is_err());
    }

    #[test]
    fn test_money_percent() {
        let m = Money::inr(Decimal::new(200, 0));
        assert_eq!(m.percent(Decimal::new(18, 0)).amount(), Decimal::new(36, 0));
    }

    #[test]
    fn test_quantity_never_underflows() {
        let q = Quantity::new(3);
        assert_eq!(q.subtract(3).unwrap().value(), 0);
        assert!(q.subtract(4).is_none());
    }
}
