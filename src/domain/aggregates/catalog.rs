//! Catalog entities: the category → subcategory → product hierarchy
//! plus the serviceable-pincode table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subcategory {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "product_status", rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Active,
    Archived,
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub subcategory_id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Decimal,
    /// Live on-hand quantity. Mutated only by checkout commits,
    /// cancellation restocks and admin absolute sets.
    pub quantity: i32,
    pub sort_order: i32,
    pub image_url: Option<String>,
    /// Display attributes: material, finish, thread spec, head type, ...
    pub attributes: serde_json::Value,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }

    pub fn available(&self) -> u32 {
        self.quantity.max(0) as u32
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct PincodeRate {
    pub code: String,
    pub city: String,
    pub state: String,
    pub delivery_days: i32,
    /// A stored zero is a real free-shipping charge, distinct from a
    /// missing or inactive row.
    pub shipping_charge: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(quantity: i32, status: ProductStatus) -> Product {
        Product {
            id: Uuid::new_v4(),
            subcategory_id: Uuid::new_v4(),
            sku: "HEX-M8".into(),
            name: "M8 Hex Bolt".into(),
            description: None,
            unit_price: Decimal::new(50, 0),
            quantity,
            sort_order: 0,
            image_url: None,
            attributes: serde_json::json!({"material": "stainless"}),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_available_clamps_at_zero() {
        assert_eq!(product(10, ProductStatus::Active).available(), 10);
        assert_eq!(product(0, ProductStatus::Active).available(), 0);
    }

    #[test]
    fn test_archived_is_inactive() {
        assert!(!product(5, ProductStatus::Archived).is_active());
    }
}
