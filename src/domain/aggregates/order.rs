//! Order Aggregate
//!
//! Fulfillment and payment run as parallel state machines: a paid order
//! can still be cancelled before shipment, and a shipped order's payment
//! state is independent of delivery tracking.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Pending, Paid) | (Pending, Cancelled) => true,
            (Paid, Processing) | (Paid, Cancelled) | (Paid, Refunded) => true,
            (Processing, Shipped) | (Processing, Cancelled) | (Processing, Refunded) => true,
            (Shipped, Delivered) | (Shipped, Cancelled) | (Shipped, Refunded) => true,
            (Delivered, Refunded) => true,
            _ => false,
        }
    }

    /// Cancellation restores stock only while the goods have not left
    /// the warehouse.
    pub fn restocks_on_cancel(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Paid | OrderStatus::Processing)
    }

    /// Hard delete is limited to orders that no longer move.
    pub fn is_closed(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Refunded)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
    Refunded,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub name: String,
    pub phone: String,
    pub street1: String,
    pub street2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: String,
    pub email: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: String,
    pub payment_reference: Option<String>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub currency: String,
    pub shipping_address: Json<Address>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Price snapshot taken at checkout commit; immutable thereafter.
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

impl Order {
    /// Builds the order row a checkout commit persists. Status starts at
    /// `pending`/`unpaid`; the payment callback moves it forward.
    pub fn place(
        user_id: impl Into<String>,
        email: impl Into<String>,
        payment_method: impl Into<String>,
        totals: OrderTotals,
        currency: &str,
        address: Address,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            order_number: generate_order_number(),
            user_id: user_id.into(),
            email: email.into(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            payment_method: payment_method.into(),
            payment_reference: None,
            subtotal: totals.subtotal,
            tax: totals.tax,
            shipping: totals.shipping,
            total: totals.total,
            currency: currency.to_string(),
            shipping_address: Json(address),
            admin_notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

fn generate_order_number() -> String {
    format!("ORD-{:08}", rand::random::<u32>() % 100_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Paid));
        assert!(Paid.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
    }

    #[test]
    fn test_cancel_reachable_before_delivery_only() {
        use OrderStatus::*;
        for s in [Pending, Paid, Processing, Shipped] {
            assert!(s.can_transition_to(Cancelled), "{s:?} should cancel");
        }
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn test_refund_reachable_from_paid_onward() {
        use OrderStatus::*;
        assert!(!Pending.can_transition_to(Refunded));
        for s in [Paid, Processing, Shipped, Delivered] {
            assert!(s.can_transition_to(Refunded), "{s:?} should refund");
        }
    }

    #[test]
    fn test_no_skipping_payment() {
        use OrderStatus::*;
        assert!(!Pending.can_transition_to(Shipped));
        assert!(!Pending.can_transition_to(Processing));
    }

    #[test]
    fn test_restock_window_closes_at_shipment() {
        use OrderStatus::*;
        assert!(Pending.restocks_on_cancel());
        assert!(Paid.restocks_on_cancel());
        assert!(Processing.restocks_on_cancel());
        assert!(!Shipped.restocks_on_cancel());
    }

    #[test]
    fn test_closed_states() {
        use OrderStatus::*;
        assert!(Delivered.is_closed());
        assert!(Cancelled.is_closed());
        assert!(Refunded.is_closed());
        assert!(!Shipped.is_closed());
    }

    #[test]
    fn test_order_number_shape() {
        let n = generate_order_number();
        assert!(n.starts_with("ORD-"));
        assert_eq!(n.len(), 12);
    }
}
