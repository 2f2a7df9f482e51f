//! Postgres-backed [`CommerceStore`].
//!
//! Stock and status writes are single conditional statements; the
//! checkout commit wraps its conditional decrements and inserts in one
//! transaction, so a failed line aborts the whole commit.

use super::{CommerceStore, OrderDraft, Page, PaymentOutcome};
use crate::domain::aggregates::cart::CartLine;
use crate::domain::aggregates::{
    Category, ContactStatus, ContactSubmission, Order, OrderItem, OrderStatus, PaymentStatus,
    PincodeRate, Product, Subcategory,
};
use crate::error::{Error, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_order(&self, id: Uuid) -> Result<Option<Order>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }
}

#[async_trait]
impl CommerceStore for PgStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories ORDER BY sort_order, name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_category(&self, id: Uuid) -> Result<Option<Category>> {
        let row = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert_category(&self, category: &Category) -> Result<()> {
        sqlx::query(
            "INSERT INTO categories (id, name, slug, description, image_url, sort_order, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(&category.image_url)
        .bind(category.sort_order)
        .bind(category.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_category(&self, category: &Category) -> Result<()> {
        let res = sqlx::query(
            "UPDATE categories SET name = $2, slug = $3, description = $4, image_url = $5, \
             sort_order = $6 WHERE id = $1",
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(&category.image_url)
        .bind(category.sort_order)
        .execute(&self.pool)
        .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("category"));
        }
        Ok(())
    }

    async fn delete_category(&self, id: Uuid) -> Result<()> {
        // Schema cascades to subcategories and products.
        let res = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("category"));
        }
        Ok(())
    }

    async fn list_subcategories(&self, category_id: Option<Uuid>) -> Result<Vec<Subcategory>> {
        let rows = match category_id {
            Some(cid) => {
                sqlx::query_as::<_, Subcategory>(
                    "SELECT * FROM subcategories WHERE category_id = $1 ORDER BY sort_order, name",
                )
                .bind(cid)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Subcategory>(
                    "SELECT * FROM subcategories ORDER BY sort_order, name",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    async fn get_subcategory(&self, id: Uuid) -> Result<Option<Subcategory>> {
        let row = sqlx::query_as::<_, Subcategory>("SELECT * FROM subcategories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert_subcategory(&self, subcategory: &Subcategory) -> Result<()> {
        sqlx::query(
            "INSERT INTO subcategories (id, category_id, name, slug, description, image_url, \
             sort_order, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(subcategory.id)
        .bind(subcategory.category_id)
        .bind(&subcategory.name)
        .bind(&subcategory.slug)
        .bind(&subcategory.description)
        .bind(&subcategory.image_url)
        .bind(subcategory.sort_order)
        .bind(subcategory.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_subcategory(&self, subcategory: &Subcategory) -> Result<()> {
        let res = sqlx::query(
            "UPDATE subcategories SET category_id = $2, name = $3, slug = $4, description = $5, \
             image_url = $6, sort_order = $7 WHERE id = $1",
        )
        .bind(subcategory.id)
        .bind(subcategory.category_id)
        .bind(&subcategory.name)
        .bind(&subcategory.slug)
        .bind(&subcategory.description)
        .bind(&subcategory.image_url)
        .bind(subcategory.sort_order)
        .execute(&self.pool)
        .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("subcategory"));
        }
        Ok(())
    }

    async fn delete_subcategory(&self, id: Uuid) -> Result<()> {
        let res = sqlx::query("DELETE FROM subcategories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("subcategory"));
        }
        Ok(())
    }

    async fn list_products(
        &self,
        subcategory_id: Option<Uuid>,
        include_archived: bool,
        page: Page,
    ) -> Result<(Vec<Product>, i64)> {
        let status_clause = if include_archived { "TRUE" } else { "status = 'active'" };
        let (rows, total) = match subcategory_id {
            Some(sid) => {
                let sql = format!(
                    "SELECT * FROM products WHERE subcategory_id = $1 AND {status_clause} \
                     ORDER BY sort_order, name LIMIT $2 OFFSET $3"
                );
                let rows = sqlx::query_as::<_, Product>(&sql)
                    .bind(sid)
                    .bind(page.limit())
                    .bind(page.offset())
                    .fetch_all(&self.pool)
                    .await?;
                let count_sql = format!(
                    "SELECT COUNT(*) FROM products WHERE subcategory_id = $1 AND {status_clause}"
                );
                let total: (i64,) = sqlx::query_as(&count_sql)
                    .bind(sid)
                    .fetch_one(&self.pool)
                    .await?;
                (rows, total.0)
            }
            None => {
                let sql = format!(
                    "SELECT * FROM products WHERE {status_clause} \
                     ORDER BY sort_order, name LIMIT $1 OFFSET $2"
                );
                let rows = sqlx::query_as::<_, Product>(&sql)
                    .bind(page.limit())
                    .bind(page.offset())
                    .fetch_all(&self.pool)
                    .await?;
                let count_sql = format!("SELECT COUNT(*) FROM products WHERE {status_clause}");
                let total: (i64,) = sqlx::query_as(&count_sql).fetch_one(&self.pool).await?;
                (rows, total.0)
            }
        };
        Ok((rows, total))
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
        let row = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_products(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert_product(&self, product: &Product) -> Result<()> {
        sqlx::query(
            "INSERT INTO products (id, subcategory_id, sku, name, description, unit_price, \
             quantity, sort_order, image_url, attributes, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(product.id)
        .bind(product.subcategory_id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.unit_price)
        .bind(product.quantity)
        .bind(product.sort_order)
        .bind(&product.image_url)
        .bind(&product.attributes)
        .bind(product.status)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<()> {
        // Quantity deliberately untouched; it has its own paths.
        let res = sqlx::query(
            "UPDATE products SET subcategory_id = $2, sku = $3, name = $4, description = $5, \
             unit_price = $6, sort_order = $7, image_url = $8, attributes = $9, status = $10, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(product.id)
        .bind(product.subcategory_id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.unit_price)
        .bind(product.sort_order)
        .bind(&product.image_url)
        .bind(&product.attributes)
        .bind(product.status)
        .execute(&self.pool)
        .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("product"));
        }
        Ok(())
    }

    async fn delete_product(&self, id: Uuid) -> Result<()> {
        let res = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("product"));
        }
        Ok(())
    }

    async fn set_product_quantity(&self, id: Uuid, quantity: u32) -> Result<Product> {
        sqlx::query_as::<_, Product>(
            "UPDATE products SET quantity = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(quantity as i32)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::NotFound("product"))
    }

    async fn list_pincodes(&self) -> Result<Vec<PincodeRate>> {
        let rows = sqlx::query_as::<_, PincodeRate>(
            "SELECT * FROM supported_pincodes ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_pincode(&self, code: &str) -> Result<Option<PincodeRate>> {
        let row = sqlx::query_as::<_, PincodeRate>(
            "SELECT * FROM supported_pincodes WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_pincode(&self, rate: &PincodeRate) -> Result<()> {
        sqlx::query(
            "INSERT INTO supported_pincodes (code, city, state, delivery_days, shipping_charge, \
             active, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&rate.code)
        .bind(&rate.city)
        .bind(&rate.state)
        .bind(rate.delivery_days)
        .bind(rate.shipping_charge)
        .bind(rate.active)
        .bind(rate.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_pincode(&self, rate: &PincodeRate) -> Result<()> {
        let res = sqlx::query(
            "UPDATE supported_pincodes SET city = $2, state = $3, delivery_days = $4, \
             shipping_charge = $5, active = $6 WHERE code = $1",
        )
        .bind(&rate.code)
        .bind(&rate.city)
        .bind(&rate.state)
        .bind(rate.delivery_days)
        .bind(rate.shipping_charge)
        .bind(rate.active)
        .execute(&self.pool)
        .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("pincode"));
        }
        Ok(())
    }

    async fn delete_pincode(&self, code: &str) -> Result<()> {
        let res = sqlx::query("DELETE FROM supported_pincodes WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("pincode"));
        }
        Ok(())
    }

    async fn cart_lines(&self, owner: &str) -> Result<Vec<CartLine>> {
        let rows = sqlx::query_as::<_, CartLine>(
            "SELECT * FROM cart_lines WHERE owner = $1 ORDER BY created_at",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn upsert_cart_line(&self, owner: &str, product_id: Uuid, quantity: u32) -> Result<()> {
        sqlx::query(
            "INSERT INTO cart_lines (owner, product_id, quantity, created_at) \
             VALUES ($1, $2, $3, NOW()) \
             ON CONFLICT (owner, product_id) DO UPDATE SET quantity = $3",
        )
        .bind(owner)
        .bind(product_id)
        .bind(quantity as i32)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_cart_line(&self, owner: &str, product_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM cart_lines WHERE owner = $1 AND product_id = $2")
            .bind(owner)
            .bind(product_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear_cart(&self, owner: &str) -> Result<()> {
        sqlx::query("DELETE FROM cart_lines WHERE owner = $1")
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn commit_order(&self, draft: OrderDraft, cart_owner: &str) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        // Conditional decrement per line; zero rows means the stock
        // moved underneath us and the whole commit rolls back.
        for item in &draft.items {
            let res = sqlx::query(
                "UPDATE products SET quantity = quantity - $2, updated_at = NOW() \
                 WHERE id = $1 AND quantity >= $2",
            )
            .bind(item.product_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
            if res.rows_affected() == 0 {
                return Err(Error::InsufficientStock { product_id: item.product_id });
            }
        }

        let order = &draft.order;
        sqlx::query(
            "INSERT INTO orders (id, order_number, user_id, email, status, payment_status, \
             payment_method, payment_reference, subtotal, tax, shipping, total, currency, \
             shipping_address, admin_notes, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
        )
        .bind(order.id)
        .bind(&order.order_number)
        .bind(&order.user_id)
        .bind(&order.email)
        .bind(order.status)
        .bind(order.payment_status)
        .bind(&order.payment_method)
        .bind(&order.payment_reference)
        .bind(order.subtotal)
        .bind(order.tax)
        .bind(order.shipping)
        .bind(order.total)
        .bind(&order.currency)
        .bind(&order.shipping_address)
        .bind(&order.admin_notes)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in &draft.items {
            sqlx::query(
                "INSERT INTO order_items (id, order_id, product_id, sku, name, quantity, \
                 unit_price, line_total) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(item.id)
            .bind(item.order_id)
            .bind(item.product_id)
            .bind(&item.sku)
            .bind(&item.name)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.line_total)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM cart_lines WHERE owner = $1")
            .bind(cart_owner)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(draft.order)
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>> {
        self.fetch_order(id).await
    }

    async fn order_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>> {
        let rows = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_orders(&self, page: Page) -> Result<(Vec<Order>, i64)> {
        let rows = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok((rows, total.0))
    }

    async fn apply_payment(&self, order_id: Uuid, reference: &str) -> Result<PaymentOutcome> {
        let applied = sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = 'paid', payment_status = 'paid', \
             payment_reference = $2, updated_at = NOW() \
             WHERE id = $1 AND payment_status = 'unpaid' AND status = 'pending' RETURNING *",
        )
        .bind(order_id)
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(order) = applied {
            return Ok(PaymentOutcome::Applied(order));
        }
        let order = self.fetch_order(order_id).await?.ok_or(Error::NotFound("order"))?;
        match order.payment_status {
            PaymentStatus::Paid | PaymentStatus::Refunded => {
                Ok(PaymentOutcome::AlreadyApplied(order))
            }
            PaymentStatus::Unpaid => Err(Error::Conflict(format!(
                "payment received for {} order {}",
                order.status.as_str(),
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
        let updated = sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = $3, payment_status = COALESCE($4, payment_status), \
             updated_at = NOW() WHERE id = $1 AND status = $2 RETURNING *",
        )
        .bind(id)
        .bind(expect)
        .bind(to)
        .bind(payment)
        .fetch_optional(&self.pool)
        .await?;
        match updated {
            Some(order) => Ok(order),
            None => match self.fetch_order(id).await? {
                Some(_) => Err(Error::Conflict("order status changed concurrently".into())),
                None => Err(Error::NotFound("order")),
            },
        }
    }

    async fn cancel_order(
        &self,
        id: Uuid,
        expect: OrderStatus,
        restock: bool,
        mark_refunded: bool,
    ) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        let cancelled = sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = 'cancelled', \
             payment_status = CASE WHEN $3 THEN 'refunded'::payment_status ELSE payment_status END, \
             updated_at = NOW() WHERE id = $1 AND status = $2 RETURNING *",
        )
        .bind(id)
        .bind(expect)
        .bind(mark_refunded)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(order) = cancelled else {
            return match self.fetch_order(id).await? {
                Some(_) => Err(Error::Conflict("order status changed concurrently".into())),
                None => Err(Error::NotFound("order")),
            };
        };

        if restock {
            sqlx::query(
                "UPDATE products p SET quantity = p.quantity + oi.quantity, updated_at = NOW() \
                 FROM order_items oi WHERE oi.order_id = $1 AND oi.product_id = p.id",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(order)
    }

    async fn set_order_notes(&self, id: Uuid, notes: Option<String>) -> Result<Order> {
        sqlx::query_as::<_, Order>(
            "UPDATE orders SET admin_notes = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(notes)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::NotFound("order"))
    }

    async fn delete_closed_order(&self, id: Uuid) -> Result<()> {
        let res = sqlx::query(
            "DELETE FROM orders WHERE id = $1 \
             AND status IN ('delivered', 'cancelled', 'refunded')",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if res.rows_affected() == 0 {
            return match self.fetch_order(id).await? {
                Some(order) => Err(Error::Conflict(format!(
                    "cannot delete {} order",
                    order.status.as_str()
                ))),
                None => Err(Error::NotFound("order")),
            };
        }
        Ok(())
    }

    async fn insert_contact(&self, submission: &ContactSubmission) -> Result<()> {
        sqlx::query(
            "INSERT INTO contact_submissions (id, name, email, phone, subject, message, status, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(submission.id)
        .bind(&submission.name)
        .bind(&submission.email)
        .bind(&submission.phone)
        .bind(&submission.subject)
        .bind(&submission.message)
        .bind(submission.status)
        .bind(submission.created_at)
        .bind(submission.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_contacts(&self, page: Page) -> Result<(Vec<ContactSubmission>, i64)> {
        let rows = sqlx::query_as::<_, ContactSubmission>(
            "SELECT * FROM contact_submissions ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contact_submissions")
            .fetch_one(&self.pool)
            .await?;
        Ok((rows, total.0))
    }

    async fn update_contact_status(
        &self,
        id: Uuid,
        status: ContactStatus,
    ) -> Result<ContactSubmission> {
        sqlx::query_as::<_, ContactSubmission>(
            "UPDATE contact_submissions SET status = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::NotFound("contact submission"))
    }

    async fn delete_contact(&self, id: Uuid) -> Result<()> {
        let res = sqlx::query("DELETE FROM contact_submissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("contact submission"));
        }
        Ok(())
    }
}
