//! Order lifecycle: guarded status transitions, the idempotent payment
//! callback and cancellation with stock restoration.

use crate::domain::aggregates::order::{Order, OrderItem, OrderStatus, PaymentStatus};
use crate::domain::events::{DomainEvent, OrderEvent, StockEvent};
use crate::error::{Error, Result};
use crate::events::EventPublisher;
use crate::store::{CommerceStore, PaymentOutcome};
use uuid::Uuid;

/// Outcome handed back to the payment gateway. Both variants are a
/// successful acknowledgement; `applied` distinguishes first delivery
/// from a replay.
#[derive(Clone, Debug)]
pub struct PaymentAck {
    pub order: Order,
    pub applied: bool,
}

/// Applies a gateway success callback. At-least-once delivery is the
/// contract: replays find the order already paid and change nothing.
pub async fn mark_paid(
    store: &dyn CommerceStore,
    events: &EventPublisher,
    order_id: Uuid,
    reference: &str,
) -> Result<PaymentAck> {
    match store.apply_payment(order_id, reference).await? {
        PaymentOutcome::Applied(order) => {
            events
                .publish(DomainEvent::Order(OrderEvent::Paid {
                    order_id: order.id,
                    reference: reference.to_string(),
                }))
                .await;
            tracing::info!(order = %order.order_number, "payment applied");
            Ok(PaymentAck { order, applied: true })
        }
        PaymentOutcome::AlreadyApplied(order) => {
            tracing::info!(order = %order.order_number, "duplicate payment callback ignored");
            Ok(PaymentAck { order, applied: false })
        }
    }
}

/// Admin-triggered transition. Validated against the state machine,
/// then written with an expected-current-state guard so a concurrent
/// transition surfaces as a conflict instead of a lost update.
pub async fn transition(
    store: &dyn CommerceStore,
    events: &EventPublisher,
    id: Uuid,
    to: OrderStatus,
) -> Result<Order> {
    let order = store.get_order(id).await?.ok_or(Error::NotFound("order"))?;
    let from = order.status;
    if !from.can_transition_to(to) {
        return Err(Error::Validation(format!(
            "cannot move order from {} to {}",
            from.as_str(),
            to.as_str()
        )));
    }

    let updated = match to {
        OrderStatus::Cancelled => return cancel(store, events, id).await,
        OrderStatus::Refunded => {
            store
                .update_order_status(id, from, to, Some(PaymentStatus::Refunded))
                .await?
        }
        OrderStatus::Paid => {
            // Manual fallback for gateways that never call back.
            store
                .update_order_status(id, from, to, Some(PaymentStatus::Paid))
                .await?
        }
        _ => store.update_order_status(id, from, to, None).await?,
    };

    let event = match to {
        OrderStatus::Refunded => OrderEvent::Refunded { order_id: id },
        _ => OrderEvent::StatusChanged { order_id: id, from, to },
    };
    events.publish(DomainEvent::Order(event)).await;
    tracing::info!(order = %updated.order_number, from = from.as_str(), to = to.as_str(), "order transitioned");
    Ok(updated)
}

/// Cancels an order. While the goods have not shipped this restores
/// exactly the quantities the placement decremented; a paid order is
/// marked refunded at the same time.
pub async fn cancel(store: &dyn CommerceStore, events: &EventPublisher, id: Uuid) -> Result<Order> {
    let order = store.get_order(id).await?.ok_or(Error::NotFound("order"))?;
    let from = order.status;
    if !from.can_transition_to(OrderStatus::Cancelled) {
        return Err(Error::Validation(format!(
            "cannot cancel a {} order",
            from.as_str()
        )));
    }
    let restock = from.restocks_on_cancel();
    let refund = order.payment_status == PaymentStatus::Paid;
    let items = store.order_items(id).await?;

    let cancelled = store.cancel_order(id, from, restock, refund).await?;

    events
        .publish(DomainEvent::Order(OrderEvent::Cancelled { order_id: id, restocked: restock }))
        .await;
    if restock {
        for item in &items {
            events
                .publish(DomainEvent::Stock(StockEvent::Restored {
                    product_id: item.product_id,
                    quantity: item.quantity as u32,
                }))
                .await;
        }
    }
    if refund {
        events.publish(DomainEvent::Order(OrderEvent::Refunded { order_id: id })).await;
    }
    tracing::info!(order = %cancelled.order_number, restocked = restock, "order cancelled");
    Ok(cancelled)
}

/// Hard delete. Only closed orders qualify; stock is never touched
/// here, cancellation is the stock-restoring path.
pub async fn delete(store: &dyn CommerceStore, id: Uuid) -> Result<()> {
    store.delete_closed_order(id).await
}

/// Fetches an order with its line snapshot, enforcing ownership.
/// Non-admin callers only see their own orders; foreign ids read as
/// missing rather than forbidden.
pub async fn fetch_detail(
    store: &dyn CommerceStore,
    user_id: &str,
    is_admin: bool,
    id: Uuid,
) -> Result<(Order, Vec<OrderItem>)> {
    let order = store.get_order(id).await?.ok_or(Error::NotFound("order"))?;
    if !is_admin && order.user_id != user_id {
        return Err(Error::NotFound("order"));
    }
    let items = store.order_items(id).await?;
    Ok((order, items))
}
