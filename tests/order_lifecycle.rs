//! Order lifecycle: idempotent payment callback, guarded transitions,
//! cancellation restock and hard-delete rules.

mod common;

use common::*;
use fastenkart::domain::aggregates::order::{Order, OrderStatus, PaymentStatus};
use fastenkart::error::Error;
use fastenkart::events::EventPublisher;
use fastenkart::services::{cart, checkout, invoice, orders};
use fastenkart::store::{CommerceStore, MemoryStore};
use uuid::Uuid;

async fn placed_order(store: &MemoryStore, quantity: u32) -> (Order, Uuid) {
    let cfg = config();
    let events = EventPublisher::disabled();
    let (_, sub) = seed_catalog(store).await;
    let bolt = seed_product(store, &sub, "M8 Hex Bolt", 50, 10).await;
    seed_pincode(store, "400001", 0, true).await;

    cart::add_item(store, &cfg.currency, "sess-1", bolt.id, quantity).await.unwrap();
    let totals = checkout::quote(store, &cfg, "sess-1", "400001").await.unwrap();
    let order = checkout::place_order(
        store,
        &events,
        &cfg,
        "user-1",
        place_request("sess-1", "400001", totals.total),
    )
    .await
    .unwrap();
    (order, bolt.id)
}

#[tokio::test]
async fn test_payment_callback_is_idempotent() {
    let store = MemoryStore::new();
    let events = EventPublisher::disabled();
    let (order, bolt_id) = placed_order(&store, 3).await;
    assert_eq!(store.get_product(bolt_id).await.unwrap().unwrap().quantity, 7);

    let first = orders::mark_paid(&store, &events, order.id, "pay_123").await.unwrap();
    assert!(first.applied);
    assert_eq!(first.order.status, OrderStatus::Paid);
    assert_eq!(first.order.payment_status, PaymentStatus::Paid);

    // Replay of the same confirmation changes nothing.
    let second = orders::mark_paid(&store, &events, order.id, "pay_123").await.unwrap();
    assert!(!second.applied);
    assert_eq!(second.order.status, OrderStatus::Paid);

    // Stock was decremented exactly once, at placement.
    assert_eq!(store.get_product(bolt_id).await.unwrap().unwrap().quantity, 7);
}

#[tokio::test]
async fn test_payment_for_unknown_order() {
    let store = MemoryStore::new();
    let events = EventPublisher::disabled();
    let err = orders::mark_paid(&store, &events, Uuid::new_v4(), "pay_1").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_cancel_paid_unshipped_restores_stock() {
    let store = MemoryStore::new();
    let events = EventPublisher::disabled();
    let (order, bolt_id) = placed_order(&store, 3).await;
    orders::mark_paid(&store, &events, order.id, "pay_123").await.unwrap();
    assert_eq!(store.get_product(bolt_id).await.unwrap().unwrap().quantity, 7);

    let cancelled = orders::cancel(&store, &events, order.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    // Paid order cancelled pre-shipment triggers the refund path.
    assert_eq!(cancelled.payment_status, PaymentStatus::Refunded);
    assert_eq!(store.get_product(bolt_id).await.unwrap().unwrap().quantity, 10);
}

#[tokio::test]
async fn test_cancel_shipped_order_keeps_stock_out() {
    let store = MemoryStore::new();
    let events = EventPublisher::disabled();
    let (order, bolt_id) = placed_order(&store, 3).await;
    orders::mark_paid(&store, &events, order.id, "pay_123").await.unwrap();
    orders::transition(&store, &events, order.id, OrderStatus::Processing).await.unwrap();
    orders::transition(&store, &events, order.id, OrderStatus::Shipped).await.unwrap();

    let cancelled = orders::cancel(&store, &events, order.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    // Goods already left the warehouse; the count stays down.
    assert_eq!(store.get_product(bolt_id).await.unwrap().unwrap().quantity, 7);
}

#[tokio::test]
async fn test_illegal_transition_rejected() {
    let store = MemoryStore::new();
    let events = EventPublisher::disabled();
    let (order, _) = placed_order(&store, 1).await;

    let err = orders::transition(&store, &events, order.id, OrderStatus::Shipped)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn test_full_lifecycle_to_delivered() {
    let store = MemoryStore::new();
    let events = EventPublisher::disabled();
    let (order, _) = placed_order(&store, 2).await;

    orders::mark_paid(&store, &events, order.id, "pay_9").await.unwrap();
    for next in [OrderStatus::Processing, OrderStatus::Shipped, OrderStatus::Delivered] {
        let updated = orders::transition(&store, &events, order.id, next).await.unwrap();
        assert_eq!(updated.status, next);
    }

    let err = orders::cancel(&store, &events, order.id).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn test_refund_after_delivery() {
    let store = MemoryStore::new();
    let events = EventPublisher::disabled();
    let (order, _) = placed_order(&store, 2).await;
    orders::mark_paid(&store, &events, order.id, "pay_9").await.unwrap();
    orders::transition(&store, &events, order.id, OrderStatus::Processing).await.unwrap();
    orders::transition(&store, &events, order.id, OrderStatus::Shipped).await.unwrap();
    orders::transition(&store, &events, order.id, OrderStatus::Delivered).await.unwrap();

    let refunded = orders::transition(&store, &events, order.id, OrderStatus::Refunded)
        .await
        .unwrap();
    assert_eq!(refunded.status, OrderStatus::Refunded);
    assert_eq!(refunded.payment_status, PaymentStatus::Refunded);
}

#[tokio::test]
async fn test_payment_callback_for_cancelled_order_conflicts() {
    let store = MemoryStore::new();
    let events = EventPublisher::disabled();
    let (order, _) = placed_order(&store, 1).await;
    orders::cancel(&store, &events, order.id).await.unwrap();

    let err = orders::mark_paid(&store, &events, order.id, "pay_late").await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn test_hard_delete_only_for_closed_orders() {
    let store = MemoryStore::new();
    let events = EventPublisher::disabled();
    let (order, bolt_id) = placed_order(&store, 2).await;

    let err = orders::delete(&store, order.id).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    orders::cancel(&store, &events, order.id).await.unwrap();
    assert_eq!(store.get_product(bolt_id).await.unwrap().unwrap().quantity, 10);

    orders::delete(&store, order.id).await.unwrap();
    assert!(store.get_order(order.id).await.unwrap().is_none());
    // Deletion never re-touches stock; the cancel already restored it.
    assert_eq!(store.get_product(bolt_id).await.unwrap().unwrap().quantity, 10);
}

#[tokio::test]
async fn test_customer_cannot_read_foreign_order() {
    let store = MemoryStore::new();
    let (order, _) = placed_order(&store, 1).await;

    let err = orders::fetch_detail(&store, "someone-else", false, order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let (found, items) = orders::fetch_detail(&store, "user-1", false, order.id).await.unwrap();
    assert_eq!(found.id, order.id);
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn test_invoice_gated_on_payment() {
    let store = MemoryStore::new();
    let events = EventPublisher::disabled();
    let (order, _) = placed_order(&store, 4).await;
    let items = store.order_items(order.id).await.unwrap();

    assert!(matches!(invoice::build(&order, &items), Err(Error::Validation(_))));

    let ack = orders::mark_paid(&store, &events, order.id, "pay_55").await.unwrap();
    let doc = invoice::build(&ack.order, &items).unwrap();
    assert_eq!(doc.order_number, order.order_number);
    assert_eq!(doc.total, order.total);
    assert_eq!(doc.lines.len(), 1);
    assert_eq!(doc.lines[0].quantity, 4);
}
