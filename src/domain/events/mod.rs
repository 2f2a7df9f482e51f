//! Domain events published to the message bus after state changes land.

use crate::domain::aggregates::order::OrderStatus;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainEvent {
    Order(OrderEvent),
    Stock(StockEvent),
    Contact(ContactEvent),
}

impl DomainEvent {
    pub fn subject(&self) -> &'static str {
        match self {
            DomainEvent::Order(_) => "orders",
            DomainEvent::Stock(_) => "stock",
            DomainEvent::Contact(_) => "contact",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: Uuid, order_number: String, user_id: String, total: Decimal },
    Paid { order_id: Uuid, reference: String },
    StatusChanged { order_id: Uuid, from: OrderStatus, to: OrderStatus },
    Cancelled { order_id: Uuid, restocked: bool },
    Refunded { order_id: Uuid },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StockEvent {
    Decremented { product_id: Uuid, quantity: u32 },
    Restored { product_id: Uuid, quantity: u32 },
    AdminSet { product_id: Uuid, quantity: u32 },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ContactEvent {
    Received { submission_id: Uuid },
}
