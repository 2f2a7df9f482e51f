#![allow(dead_code)]

use chrono::Utc;
use fastenkart::domain::aggregates::order::Address;
use fastenkart::domain::aggregates::{
    Category, PincodeRate, Product, ProductStatus, Subcategory,
};
use fastenkart::services::checkout::PlaceOrder;
use fastenkart::store::{CommerceStore, MemoryStore};
use fastenkart::AppConfig;
use rust_decimal::Decimal;
use uuid::Uuid;

pub fn config() -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".into(),
        database_url: "postgres://unused".into(),
        nats_url: None,
        tax_rate_percent: Decimal::new(18, 0),
        currency: "INR".into(),
        admin_email: "admin@example.com".into(),
    }
}

pub async fn seed_catalog(store: &MemoryStore) -> (Category, Subcategory) {
    let category = Category {
        id: Uuid::new_v4(),
        name: "Bolts".into(),
        slug: "bolts".into(),
        description: None,
        image_url: None,
        sort_order: 1,
        created_at: Utc::now(),
    };
    store.insert_category(&category).await.unwrap();

    let subcategory = Subcategory {
        id: Uuid::new_v4(),
        category_id: category.id,
        name: "Hex Bolts".into(),
        slug: "hex-bolts".into(),
        description: None,
        image_url: None,
        sort_order: 1,
        created_at: Utc::now(),
    };
    store.insert_subcategory(&subcategory).await.unwrap();
    (category, subcategory)
}

pub async fn seed_product(
    store: &MemoryStore,
    subcategory: &Subcategory,
    name: &str,
    price_rupees: i64,
    quantity: i32,
) -> Product {
    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4(),
        subcategory_id: subcategory.id,
        sku: format!("SKU-{}", name.to_uppercase().replace(' ', "-")),
        name: name.into(),
        description: None,
        unit_price: Decimal::new(price_rupees, 0),
        quantity,
        sort_order: 0,
        image_url: None,
        attributes: serde_json::json!({"material": "stainless"}),
        status: ProductStatus::Active,
        created_at: now,
        updated_at: now,
    };
    store.insert_product(&product).await.unwrap();
    product
}

pub async fn seed_pincode(
    store: &MemoryStore,
    code: &str,
    charge_rupees: i64,
    active: bool,
) -> PincodeRate {
    let rate = PincodeRate {
        code: code.into(),
        city: "Mumbai".into(),
        state: "Maharashtra".into(),
        delivery_days: 3,
        shipping_charge: Decimal::new(charge_rupees, 0),
        active,
        created_at: Utc::now(),
    };
    store.insert_pincode(&rate).await.unwrap();
    rate
}

pub fn address(pincode: &str) -> Address {
    Address {
        name: "Asha Rao".into(),
        phone: "9820012345".into(),
        street1: "14 Industrial Estate".into(),
        street2: None,
        city: "Mumbai".into(),
        state: "Maharashtra".into(),
        pincode: pincode.into(),
    }
}

pub fn place_request(cart_owner: &str, pincode: &str, confirmed_total: Decimal) -> PlaceOrder {
    PlaceOrder {
        cart_owner: cart_owner.into(),
        email: "buyer@example.com".into(),
        payment_method: "upi".into(),
        address: address(pincode),
        confirmed_total,
    }
}
