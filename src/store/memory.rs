//! In-memory store used by tests and local development.
//!
//! All state sits behind one lock, which makes multi-row operations
//! (checkout commit, cancel-with-restock) atomic by construction, the
//! same guarantee the Postgres store gets from transactions.

use super::{CommerceStore, OrderDraft, Page, PaymentOutcome};
use crate::domain::aggregates::cart::CartLine;
use crate::domain::aggregates::{
    Category, ContactStatus, ContactSubmission, Order, OrderItem, OrderStatus, PaymentStatus,
    PincodeRate, Product, Subcategory,
};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    categories: HashMap<Uuid, Category>,
    subcategories: HashMap<Uuid, Subcategory>,
    products: HashMap<Uuid, Product>,
    pincodes: HashMap<String, PincodeRate>,
    cart_lines: HashMap<(String, Uuid), CartLine>,
    orders: HashMap<Uuid, Order>,
    order_items: HashMap<Uuid, Vec<OrderItem>>,
    contacts: HashMap<Uuid, ContactSubmission>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_rank<T>(mut rows: Vec<T>, key: impl Fn(&T) -> (i32, String)) -> Vec<T> {
    rows.sort_by_key(|r| key(r));
    rows
}

#[async_trait]
impl CommerceStore for MemoryStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let inner = self.inner.lock().await;
        Ok(sorted_by_rank(inner.categories.values().cloned().collect(), |c| {
            (c.sort_order, c.name.clone())
        }))
    }

    async fn get_category(&self, id: Uuid) -> Result<Option<Category>> {
        Ok(self.inner.lock().await.categories.get(&id).cloned())
    }

    async fn insert_category(&self, category: &Category) -> Result<()> {
        self.inner.lock().await.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn update_category(&self, category: &Category) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if !inner.categories.contains_key(&category.id) {
            return Err(Error::NotFound("category"));
        }
        inner.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn delete_category(&self, id: Uuid) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.categories.remove(&id).is_none() {
            return Err(Error::NotFound("category"));
        }
        let sub_ids: Vec<Uuid> = inner
            .subcategories
            .values()
            .filter(|s| s.category_id == id)
            .map(|s| s.id)
            .collect();
        for sub_id in &sub_ids {
            inner.subcategories.remove(sub_id);
        }
        let product_ids: Vec<Uuid> = inner
            .products
            .values()
            .filter(|p| sub_ids.contains(&p.subcategory_id))
            .map(|p| p.id)
            .collect();
        for pid in &product_ids {
            inner.products.remove(pid);
        }
        inner.cart_lines.retain(|(_, pid), _| !product_ids.contains(pid));
        Ok(())
    }

    async fn list_subcategories(&self, category_id: Option<Uuid>) -> Result<Vec<Subcategory>> {
        let inner = self.inner.lock().await;
        let rows = inner
            .subcategories
            .values()
            .filter(|s| category_id.map_or(true, |c| s.category_id == c))
            .cloned()
            .collect();
        Ok(sorted_by_rank(rows, |s| (s.sort_order, s.name.clone())))
    }

    async fn get_subcategory(&self, id: Uuid) -> Result<Option<Subcategory>> {
        Ok(self.inner.lock().await.subcategories.get(&id).cloned())
    }

    async fn insert_subcategory(&self, subcategory: &Subcategory) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if !inner.categories.contains_key(&subcategory.category_id) {
            return Err(Error::NotFound("category"));
        }
        inner.subcategories.insert(subcategory.id, subcategory.clone());
        Ok(())
    }

    async fn update_subcategory(&self, subcategory: &Subcategory) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if !inner.subcategories.contains_key(&subcategory.id) {
            return Err(Error::NotFound("subcategory"));
        }
        if !inner.categories.contains_key(&subcategory.category_id) {
            return Err(Error::NotFound("category"));
        }
        inner.subcategories.insert(subcategory.id, subcategory.clone());
        Ok(())
    }

    async fn delete_subcategory(&self, id: Uuid) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.subcategories.remove(&id).is_none() {
            return Err(Error::NotFound("subcategory"));
        }
        let product_ids: Vec<Uuid> = inner
            .products
            .values()
            .filter(|p| p.subcategory_id == id)
            .map(|p| p.id)
            .collect();
        for pid in &product_ids {
            inner.products.remove(pid);
        }
        inner.cart_lines.retain(|(_, pid), _| !product_ids.contains(pid));
        Ok(())
    }

    async fn list_products(
        &self,
        subcategory_id: Option<Uuid>,
        include_archived: bool,
        page: Page,
    ) -> Result<(Vec<Product>, i64)> {
        let inner = self.inner.lock().await;
        let rows: Vec<Product> = inner
            .products
            .values()
            .filter(|p| subcategory_id.map_or(true, |s| p.subcategory_id == s))
            .filter(|p| include_archived || p.is_active())
            .cloned()
            .collect();
        let total = rows.len() as i64;
        let rows = sorted_by_rank(rows, |p| (p.sort_order, p.name.clone()));
        let rows = rows
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((rows, total))
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(self.inner.lock().await.products.get(&id).cloned())
    }

    async fn get_products(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
        let inner = self.inner.lock().await;
        Ok(ids.iter().filter_map(|id| inner.products.get(id).cloned()).collect())
    }

    async fn insert_product(&self, product: &Product) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if !inner.subcategories.contains_key(&product.subcategory_id) {
            return Err(Error::NotFound("subcategory"));
        }
        inner.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if !inner.subcategories.contains_key(&product.subcategory_id) {
            return Err(Error::NotFound("subcategory"));
        }
        let existing = inner.products.get_mut(&product.id).ok_or(Error::NotFound("product"))?;
        // Quantity only moves through its dedicated paths.
        let quantity = existing.quantity;
        *existing = product.clone();
        existing.quantity = quantity;
        existing.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_product(&self, id: Uuid) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.products.remove(&id).is_none() {
            return Err(Error::NotFound("product"));
        }
        inner.cart_lines.retain(|(_, pid), _| *pid != id);
        Ok(())
    }

    async fn set_product_quantity(&self, id: Uuid, quantity: u32) -> Result<Product> {
        let mut inner = self.inner.lock().await;
        let product = inner.products.get_mut(&id).ok_or(Error::NotFound("product"))?;
        product.quantity = quantity as i32;
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn list_pincodes(&self) -> Result<Vec<PincodeRate>> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<PincodeRate> = inner.pincodes.values().cloned().collect();
        rows.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(rows)
    }

    async fn get_pincode(&self, code: &str) -> Result<Option<PincodeRate>> {
        Ok(self.inner.lock().await.pincodes.get(code).cloned())
    }

    async fn insert_pincode(&self, rate: &PincodeRate) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.pincodes.contains_key(&rate.code) {
            return Err(Error::Conflict(format!("pincode {} already exists", rate.code)));
        }
        inner.pincodes.insert(rate.code.clone(), rate.clone());
        Ok(())
    }

    async fn update_pincode(&self, rate: &PincodeRate) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if !inner.pincodes.contains_key(&rate.code) {
            return Err(Error::NotFound("pincode"));
        }
        inner.pincodes.insert(rate.code.clone(), rate.clone());
        Ok(())
    }

    async fn delete_pincode(&self, code: &str) -> Result<()> {
        self.inner
            .lock()
            .await
            .pincodes
            .remove(code)
            .map(|_| ())
            .ok_or(Error::NotFound("pincode"))
    }

    async fn cart_lines(&self, owner: &str) -> Result<Vec<CartLine>> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<CartLine> = inner
            .cart_lines
            .values()
            .filter(|l| l.owner == owner)
            .cloned()
            .collect();
        rows.sort_by_key(|l| l.created_at);
        Ok(rows)
    }

    async fn upsert_cart_line(&self, owner: &str, product_id: Uuid, quantity: u32) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if !inner.products.contains_key(&product_id) {
            return Err(Error::NotFound("product"));
        }
        let key = (owner.to_string(), product_id);
        match inner.cart_lines.get_mut(&key) {
            Some(line) => line.quantity = quantity as i32,
            None => {
                inner.cart_lines.insert(
                    key,
                    CartLine {
                        owner: owner.to_string(),
                        product_id,
                        quantity: quantity as i32,
                        created_at: Utc::now(),
                    },
                );
            }
        }
        Ok(())
    }

    async fn delete_cart_line(&self, owner: &str, product_id: Uuid) -> Result<()> {
        self.inner
            .lock()
            .await
            .cart_lines
            .remove(&(owner.to_string(), product_id));
        Ok(())
    }

    async fn clear_cart(&self, owner: &str) -> Result<()> {
        self.inner.lock().await.cart_lines.retain(|(o, _), _| o != owner);
        Ok(())
    }

    async fn commit_order(&self, draft: OrderDraft, cart_owner: &str) -> Result<Order> {
        let mut inner = self.inner.lock().await;

        // Validate every line before touching anything.
        for item in &draft.items {
            let product = inner
                .products
                .get(&item.product_id)
                .ok_or(Error::NotFound("product"))?;
            if product.quantity < item.quantity {
                return Err(Error::InsufficientStock { product_id: item.product_id });
            }
        }

        for item in &draft.items {
            let product = inner
                .products
                .get_mut(&item.product_id)
                .expect("validated above");
            product.quantity -= item.quantity;
            product.updated_at = Utc::now();
        }

        let order = draft.order.clone();
        inner.order_items.insert(order.id, draft.items);
        inner.orders.insert(order.id, order.clone());
        inner.cart_lines.retain(|(o, _), _| o != cart_owner);
        Ok(order)
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>> {
        Ok(self.inner.lock().await.orders.get(&id).cloned())
    }

    async fn order_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>> {
        Ok(self
            .inner
            .lock()
            .await
            .order_items
            .get(&order_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<Order> = inner
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn list_orders(&self, page: Page) -> Result<(Vec<Order>, i64)> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<Order> = inner.orders.values().cloned().collect();
        let total = rows.len() as i64;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let rows = rows
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((rows, total))
    }

    async fn apply_payment(&self, order_id: Uuid, reference: &str) -> Result<PaymentOutcome> {
        let mut inner = self.inner.lock().await;
        let order = inner.orders.get_mut(&order_id).ok_or(Error::NotFound("order"))?;
        match (order.payment_status, order.status) {
            (PaymentStatus::Unpaid, OrderStatus::Pending) => {
                order.payment_status = PaymentStatus::Paid;
                order.status = OrderStatus::Paid;
                order.payment_reference = Some(reference.to_string());
                order.updated_at = Utc::now();
                Ok(PaymentOutcome::Applied(order.clone()))
            }
            (PaymentStatus::Paid | PaymentStatus::Refunded, _) => {
                Ok(PaymentOutcome::AlreadyApplied(order.clone()))
            }
            (PaymentStatus::Unpaid, status) => Err(Error::Conflict(format!(
                "payment received for {} order {}",
                status.as_str(),
                order.order_number
            ))),
        }
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        expect: OrderStatus,
        to: OrderStatus,
        payment: Option<PaymentStatus>,
    ) -> Result<Order> {
        let mut inner = self.inner.lock().await;
        let order = inner.orders.get_mut(&id).ok_or(Error::NotFound("order"))?;
        if order.status != expect {
            return Err(Error::Conflict("order status changed concurrently".into()));
        }
        order.status = to;
        if let Some(p) = payment {
            order.payment_status = p;
        }
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn cancel_order(
        &self,
        id: Uuid,
        expect: OrderStatus,
        restock: bool,
        mark_refunded: bool,
    ) -> Result<Order> {
        let mut inner = self.inner.lock().await;
        let order = inner.orders.get(&id).ok_or(Error::NotFound("order"))?.clone();
        if order.status != expect {
            return Err(Error::Conflict("order status changed concurrently".into()));
        }
        if restock {
            let items = inner.order_items.get(&id).cloned().unwrap_or_default();
            for item in items {
                // Product may have been removed from the catalog since.
                if let Some(product) = inner.products.get_mut(&item.product_id) {
                    product.quantity += item.quantity;
                    product.updated_at = Utc::now();
                }
            }
        }
        let order = inner.orders.get_mut(&id).expect("fetched above");
        order.status = OrderStatus::Cancelled;
        if mark_refunded {
            order.payment_status = PaymentStatus::Refunded;
        }
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn set_order_notes(&self, id: Uuid, notes: Option<String>) -> Result<Order> {
        let mut inner = self.inner.lock().await;
        let order = inner.orders.get_mut(&id).ok_or(Error::NotFound("order"))?;
        order.admin_notes = notes;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn delete_closed_order(&self, id: Uuid) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let order = inner.orders.get(&id).ok_or(Error::NotFound("order"))?;
        if !order.status.is_closed() {
            return Err(Error::Conflict(format!(
                "cannot delete {} order",
                order.status.as_str()
            )));
        }
        inner.orders.remove(&id);
        inner.order_items.remove(&id);
        Ok(())
    }

    async fn insert_contact(&self, submission: &ContactSubmission) -> Result<()> {
        self.inner
            .lock()
            .await
            .contacts
            .insert(submission.id, submission.clone());
        Ok(())
    }

    async fn list_contacts(&self, page: Page) -> Result<(Vec<ContactSubmission>, i64)> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<ContactSubmission> = inner.contacts.values().cloned().collect();
        let total = rows.len() as i64;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let rows = rows
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((rows, total))
    }

    async fn update_contact_status(
        &self,
        id: Uuid,
        status: ContactStatus,
    ) -> Result<ContactSubmission> {
        let mut inner = self.inner.lock().await;
        let submission = inner.contacts.get_mut(&id).ok_or(Error::NotFound("contact submission"))?;
        submission.status = status;
        submission.updated_at = Utc::now();
        Ok(submission.clone())
    }

    async fn delete_contact(&self, id: Uuid) -> Result<()> {
        self.inner
            .lock()
            .await
            .contacts
            .remove(&id)
            .map(|_| ())
            .ok_or(Error::NotFound("contact submission"))
    }
}
