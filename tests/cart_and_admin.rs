//! Cart stock awareness, login merge policy and admin-side data rules.

mod common;

use common::*;
use fastenkart::domain::aggregates::{ContactStatus, ContactSubmission};
use fastenkart::error::Error;
use fastenkart::services::cart;
use fastenkart::store::{CommerceStore, MemoryStore, Page};
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::test]
async fn test_add_item_never_exceeds_stock() {
    let store = MemoryStore::new();
    let cfg = config();
    let (_, sub) = seed_catalog(&store).await;
    let bolt = seed_product(&store, &sub, "M8 Hex Bolt", 50, 5).await;

    let view = cart::add_item(&store, &cfg.currency, "sess-1", bolt.id, 3).await.unwrap();
    assert_eq!(view.quantity_of(bolt.id), 3);

    // 3 already reserved by this cart; 3 more would exceed the 5 on hand.
    let err = cart::add_item(&store, &cfg.currency, "sess-1", bolt.id, 3).await.unwrap_err();
    assert!(matches!(err, Error::OutOfStock { available: 5, .. }));

    // No silent clamping: the cart still holds exactly 3.
    let view = cart::view(&store, &cfg.currency, "sess-1").await.unwrap();
    assert_eq!(view.quantity_of(bolt.id), 3);

    // Topping up to the exact limit is fine.
    let view = cart::add_item(&store, &cfg.currency, "sess-1", bolt.id, 2).await.unwrap();
    assert_eq!(view.quantity_of(bolt.id), 5);
}

#[tokio::test]
async fn test_set_quantity_and_remove() {
    let store = MemoryStore::new();
    let cfg = config();
    let (_, sub) = seed_catalog(&store).await;
    let bolt = seed_product(&store, &sub, "M8 Hex Bolt", 50, 5).await;

    cart::add_item(&store, &cfg.currency, "sess-1", bolt.id, 2).await.unwrap();

    let err = cart::set_quantity(&store, &cfg.currency, "sess-1", bolt.id, 9).await.unwrap_err();
    assert!(matches!(err, Error::OutOfStock { .. }));

    let view = cart::set_quantity(&store, &cfg.currency, "sess-1", bolt.id, 4).await.unwrap();
    assert_eq!(view.quantity_of(bolt.id), 4);

    // Zero removes the line.
    let view = cart::set_quantity(&store, &cfg.currency, "sess-1", bolt.id, 0).await.unwrap();
    assert!(!view.contains(bolt.id));

    cart::add_item(&store, &cfg.currency, "sess-1", bolt.id, 1).await.unwrap();
    let view = cart::remove_item(&store, &cfg.currency, "sess-1", bolt.id).await.unwrap();
    assert!(view.is_empty());
}

#[tokio::test]
async fn test_cart_totals_and_item_count() {
    let store = MemoryStore::new();
    let cfg = config();
    let (_, sub) = seed_catalog(&store).await;
    let bolt = seed_product(&store, &sub, "M8 Hex Bolt", 50, 10).await;
    let nut = seed_product(&store, &sub, "M8 Hex Nut", 5, 100).await;

    cart::add_item(&store, &cfg.currency, "sess-1", bolt.id, 2).await.unwrap();
    let view = cart::add_item(&store, &cfg.currency, "sess-1", nut.id, 10).await.unwrap();

    assert_eq!(view.total_item_count(), 12);
    assert_eq!(view.subtotal.amount(), Decimal::new(150, 0));
}

#[tokio::test]
async fn test_merge_on_login_user_cart_wins() {
    let store = MemoryStore::new();
    let cfg = config();
    let (_, sub) = seed_catalog(&store).await;
    let bolt = seed_product(&store, &sub, "M8 Hex Bolt", 50, 20).await;
    let nut = seed_product(&store, &sub, "M8 Hex Nut", 5, 100).await;

    // Anonymous browsing, then an existing user cart from a prior visit.
    cart::add_item(&store, &cfg.currency, "sess-1", bolt.id, 2).await.unwrap();
    cart::add_item(&store, &cfg.currency, "sess-1", nut.id, 8).await.unwrap();
    cart::add_item(&store, &cfg.currency, "user-7", bolt.id, 5).await.unwrap();

    let merged = cart::merge_on_login(&store, &cfg.currency, "sess-1", "user-7").await.unwrap();

    // Conflict on the bolt: the authenticated cart's quantity stands.
    assert_eq!(merged.quantity_of(bolt.id), 5);
    // The nut line moved over verbatim.
    assert_eq!(merged.quantity_of(nut.id), 8);
    // The session cart is gone.
    let session = cart::view(&store, &cfg.currency, "sess-1").await.unwrap();
    assert!(session.is_empty());
}

#[tokio::test]
async fn test_category_delete_cascades() {
    let store = MemoryStore::new();
    let cfg = config();
    let (cat, sub) = seed_catalog(&store).await;
    let bolt = seed_product(&store, &sub, "M8 Hex Bolt", 50, 10).await;
    cart::add_item(&store, &cfg.currency, "sess-1", bolt.id, 1).await.unwrap();

    store.delete_category(cat.id).await.unwrap();

    assert!(store.get_subcategory(sub.id).await.unwrap().is_none());
    assert!(store.get_product(bolt.id).await.unwrap().is_none());
    // Cart lines referencing the removed product are swept too.
    let view = cart::view(&store, &cfg.currency, "sess-1").await.unwrap();
    assert!(view.is_empty());
}

#[tokio::test]
async fn test_subcategory_delete_cascades_to_products() {
    let store = MemoryStore::new();
    let (_, sub) = seed_catalog(&store).await;
    let bolt = seed_product(&store, &sub, "M8 Hex Bolt", 50, 10).await;

    store.delete_subcategory(sub.id).await.unwrap();
    assert!(store.get_product(bolt.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_product_update_leaves_quantity_alone() {
    let store = MemoryStore::new();
    let (_, sub) = seed_catalog(&store).await;
    let bolt = seed_product(&store, &sub, "M8 Hex Bolt", 50, 10).await;

    let mut edited = bolt.clone();
    edited.name = "M8 Hex Bolt (zinc)".into();
    edited.unit_price = Decimal::new(55, 0);
    edited.quantity = 999;
    store.update_product(&edited).await.unwrap();

    let stored = store.get_product(bolt.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "M8 Hex Bolt (zinc)");
    assert_eq!(stored.unit_price, Decimal::new(55, 0));
    // Quantity only moves through its dedicated paths.
    assert_eq!(stored.quantity, 10);

    let stored = store.set_product_quantity(bolt.id, 42).await.unwrap();
    assert_eq!(stored.quantity, 42);
}

#[tokio::test]
async fn test_dangling_references_rejected() {
    let store = MemoryStore::new();
    let (_, sub) = seed_catalog(&store).await;

    let mut orphan = seed_product(&store, &sub, "M8 Hex Bolt", 50, 10).await;
    orphan.id = Uuid::new_v4();
    orphan.subcategory_id = Uuid::new_v4();
    assert!(matches!(store.insert_product(&orphan).await, Err(Error::NotFound(_))));

    let err = store
        .upsert_cart_line("sess-1", Uuid::new_v4(), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_pincode_crud() {
    let store = MemoryStore::new();
    let rate = seed_pincode(&store, "400001", 0, true).await;

    let err = store.insert_pincode(&rate).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    let mut updated = rate.clone();
    updated.shipping_charge = Decimal::new(30, 0);
    updated.active = false;
    store.update_pincode(&updated).await.unwrap();
    let stored = store.get_pincode("400001").await.unwrap().unwrap();
    assert_eq!(stored.shipping_charge, Decimal::new(30, 0));
    assert!(!stored.active);

    store.delete_pincode("400001").await.unwrap();
    assert!(store.get_pincode("400001").await.unwrap().is_none());
    assert!(matches!(store.delete_pincode("400001").await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_contact_inbox_flow() {
    let store = MemoryStore::new();
    let now = Utc::now();
    let submission = ContactSubmission {
        id: Uuid::new_v4(),
        name: "Asha Rao".into(),
        email: "asha@example.com".into(),
        phone: None,
        subject: "Bulk pricing".into(),
        message: "Looking for 5000 M8 bolts.".into(),
        status: ContactStatus::New,
        created_at: now,
        updated_at: now,
    };
    store.insert_contact(&submission).await.unwrap();

    let (listed, total) = store.list_contacts(Page::new(None, None)).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(listed[0].status, ContactStatus::New);

    let updated = store
        .update_contact_status(submission.id, ContactStatus::Replied)
        .await
        .unwrap();
    assert_eq!(updated.status, ContactStatus::Replied);

    store.delete_contact(submission.id).await.unwrap();
    let (_, total) = store.list_contacts(Page::new(None, None)).await.unwrap();
    assert_eq!(total, 0);
}

#[tokio::test]
async fn test_catalog_listing_respects_sort_and_archive() {
    let store = MemoryStore::new();
    let (_, sub) = seed_catalog(&store).await;
    let mut first = seed_product(&store, &sub, "Anchor Bolt", 80, 5).await;
    let second = seed_product(&store, &sub, "M8 Hex Bolt", 50, 5).await;

    first.sort_order = 5;
    store.update_product(&first).await.unwrap();

    let (rows, _) = store.list_products(Some(sub.id), false, Page::new(None, None)).await.unwrap();
    assert_eq!(rows[0].id, second.id, "lower sort key lists first");

    let mut archived = second.clone();
    archived.status = fastenkart::domain::aggregates::ProductStatus::Archived;
    store.update_product(&archived).await.unwrap();

    let (rows, total) = store.list_products(Some(sub.id), false, Page::new(None, None)).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].id, first.id);

    let (rows, _) = store.list_products(Some(sub.id), true, Page::new(None, None)).await.unwrap();
    assert_eq!(rows.len(), 2);
}
