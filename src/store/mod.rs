//! Data access boundary.
//!
//! Every handler and service talks to storage through [`CommerceStore`],
//! constructed once at startup and passed down explicitly. Production
//! uses [`PgStore`]; tests substitute [`MemoryStore`].
//!
//! Stock-sensitive operations (`commit_order`, `apply_payment`,
//! `update_order_status`, `cancel_order`) are conditional updates: they
//! verify the expected current state as part of the write, never as a
//! separate read.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::domain::aggregates::{
    Category, ContactStatus, ContactSubmission, Order, OrderItem, OrderStatus, PaymentStatus,
    PincodeRate, Product, Subcategory,
};
use crate::domain::aggregates::cart::CartLine;
use crate::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Pagination window, clamped to sane bounds.
#[derive(Clone, Copy, Debug)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
}

impl Page {
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(20).clamp(1, 100),
        }
    }

    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }

    pub fn offset(&self) -> i64 {
        ((self.page - 1) * self.per_page) as i64
    }
}

/// A fully priced order plus its line snapshot, ready to commit.
#[derive(Clone, Debug)]
pub struct OrderDraft {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Result of applying a payment-gateway confirmation.
#[derive(Clone, Debug)]
pub enum PaymentOutcome {
    Applied(Order),
    /// The callback was a duplicate; the order was already paid.
    AlreadyApplied(Order),
}

#[async_trait]
pub trait CommerceStore: Send + Sync {
    // ----- catalog -----
    async fn list_categories(&self) -> Result<Vec<Category>>;
    async fn get_category(&self, id: Uuid) -> Result<Option<Category>>;
    async fn insert_category(&self, category: &Category) -> Result<()>;
    async fn update_category(&self, category: &Category) -> Result<()>;
    /// Cascades to subcategories and their products.
    async fn delete_category(&self, id: Uuid) -> Result<()>;

    async fn list_subcategories(&self, category_id: Option<Uuid>) -> Result<Vec<Subcategory>>;
    async fn get_subcategory(&self, id: Uuid) -> Result<Option<Subcategory>>;
    async fn insert_subcategory(&self, subcategory: &Subcategory) -> Result<()>;
    async fn update_subcategory(&self, subcategory: &Subcategory) -> Result<()>;
    async fn delete_subcategory(&self, id: Uuid) -> Result<()>;

    async fn list_products(
        &self,
        subcategory_id: Option<Uuid>,
        include_archived: bool,
        page: Page,
    ) -> Result<(Vec<Product>, i64)>;
    async fn get_product(&self, id: Uuid) -> Result<Option<Product>>;
    async fn get_products(&self, ids: &[Uuid]) -> Result<Vec<Product>>;
    async fn insert_product(&self, product: &Product) -> Result<()>;
    /// Updates everything except `quantity`; stock has its own paths.
    async fn update_product(&self, product: &Product) -> Result<()>;
    async fn delete_product(&self, id: Uuid) -> Result<()>;
    /// Admin absolute set, last-writer-wins.
    async fn set_product_quantity(&self, id: Uuid, quantity: u32) -> Result<Product>;

    // ----- pincode rates -----
    async fn list_pincodes(&self) -> Result<Vec<PincodeRate>>;
    async fn get_pincode(&self, code: &str) -> Result<Option<PincodeRate>>;
    async fn insert_pincode(&self, rate: &PincodeRate) -> Result<()>;
    async fn update_pincode(&self, rate: &PincodeRate) -> Result<()>;
    async fn delete_pincode(&self, code: &str) -> Result<()>;

    // ----- cart -----
    async fn cart_lines(&self, owner: &str) -> Result<Vec<CartLine>>;
    async fn upsert_cart_line(&self, owner: &str, product_id: Uuid, quantity: u32) -> Result<()>;
    async fn delete_cart_line(&self, owner: &str, product_id: Uuid) -> Result<()>;
    async fn clear_cart(&self, owner: &str) -> Result<()>;

    // ----- orders -----
    /// The checkout commit. Decrements every line's stock via a
    /// conditional update, inserts the order with its snapshot and
    /// clears the owning cart, all-or-nothing. Fails with
    /// `InsufficientStock` leaving no partial state behind.
    async fn commit_order(&self, draft: OrderDraft, cart_owner: &str) -> Result<Order>;

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>>;
    async fn order_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>>;
    async fn list_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>>;
    async fn list_orders(&self, page: Page) -> Result<(Vec<Order>, i64)>;

    /// Idempotent `pending → paid`: applies only while the order is
    /// still unpaid, so replayed gateway callbacks are no-ops.
    async fn apply_payment(&self, order_id: Uuid, reference: &str) -> Result<PaymentOutcome>;

    /// Guarded transition: writes only if the row still holds `expect`.
    async fn update_order_status(
        &self,
        id: Uuid,
        expect: OrderStatus,
        to: OrderStatus,
        payment: Option<PaymentStatus>,
    ) -> Result<Order>;

    /// Guarded cancel; optionally restores the line quantities and
    /// marks payment refunded, atomically with the transition.
    async fn cancel_order(
        &self,
        id: Uuid,
        expect: OrderStatus,
        restock: bool,
        mark_refunded: bool,
    ) -> Result<Order>;

    async fn set_order_notes(&self, id: Uuid, notes: Option<String>) -> Result<Order>;

    /// Hard delete, permitted only for closed orders. Never touches
    /// stock; cancellation is the stock-restoring path.
    async fn delete_closed_order(&self, id: Uuid) -> Result<()>;

    // ----- contact submissions -----
    async fn insert_contact(&self, submission: &ContactSubmission) -> Result<()>;
    async fn list_contacts(&self, page: Page) -> Result<(Vec<ContactSubmission>, i64)>;
    async fn update_contact_status(
        &self,
        id: Uuid,
        status: ContactStatus,
    ) -> Result<ContactSubmission>;
    async fn delete_contact(&self, id: Uuid) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_clamps() {
        let p = Page::new(None, None);
        assert_eq!((p.page, p.per_page), (1, 20));
        let p = Page::new(Some(0), Some(1000));
        assert_eq!((p.page, p.per_page), (1, 100));
        let p = Page::new(Some(3), Some(10));
        assert_eq!(p.offset(), 20);
    }
}
