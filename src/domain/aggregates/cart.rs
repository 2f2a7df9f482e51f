//! Cart Aggregate
//!
//! The persisted shape is one `CartLine` per (owner, product). `Cart` is
//! the enriched view built from lines joined with live product rows.

use crate::domain::value_objects::Money;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct CartLine {
    /// Anonymous session id or authenticated user id.
    pub owner: String,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CartEntry {
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub image_url: Option<String>,
    pub unit_price: Money,
    pub quantity: u32,
    pub line_total: Money,
    /// Live on-hand quantity at read time; stale by the time the user
    /// acts on it, which is why checkout re-validates.
    pub available: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct Cart {
    pub owner: String,
    pub items: Vec<CartEntry>,
    pub subtotal: Money,
}

impl Cart {
    pub fn build(owner: impl Into<String>, currency: &str, items: Vec<CartEntry>) -> Result<Self> {
        let mut subtotal = Money::zero(currency);
        for item in &items {
            subtotal = subtotal.add(&item.line_total)?;
        }
        Ok(Self { owner: owner.into(), items, subtotal })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, product_id: Uuid) -> bool {
        self.items.iter().any(|i| i.product_id == product_id)
    }

    pub fn quantity_of(&self, product_id: Uuid) -> u32 {
        self.items
            .iter()
            .find(|i| i.product_id == product_id)
            .map(|i| i.quantity)
            .unwrap_or(0)
    }

    /// Total units across all lines, not the number of distinct lines.
    pub fn total_item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn entry(quantity: u32, price: i64) -> CartEntry {
        let unit_price = Money::inr(Decimal::new(price, 0));
        CartEntry {
            product_id: Uuid::new_v4(),
            sku: "S".into(),
            name: "bolt".into(),
            image_url: None,
            line_total: unit_price.multiply(quantity),
            unit_price,
            quantity,
            available: 100,
        }
    }

    #[test]
    fn test_cart_totals() {
        let cart = Cart::build("sess-1", "INR", vec![entry(2, 10), entry(3, 5)]).unwrap();
        assert_eq!(cart.subtotal.amount(), Decimal::new(35, 0));
        assert_eq!(cart.total_item_count(), 5);
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_quantity_lookup() {
        let e = entry(4, 10);
        let id = e.product_id;
        let cart = Cart::build("sess-1", "INR", vec![e]).unwrap();
        assert!(cart.contains(id));
        assert_eq!(cart.quantity_of(id), 4);
        assert_eq!(cart.quantity_of(Uuid::new_v4()), 0);
    }
}
