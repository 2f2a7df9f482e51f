//! Stock-aware cart operations.
//!
//! Every mutation re-validates the requested quantity against the live
//! on-hand count before it is confirmed; the cart never holds more of a
//! product than the catalog can currently supply.

use crate::domain::aggregates::cart::{Cart, CartEntry};
use crate::domain::value_objects::Money;
use crate::error::{Error, Result};
use crate::store::CommerceStore;
use uuid::Uuid;

pub async fn view(store: &dyn CommerceStore, currency: &str, owner: &str) -> Result<Cart> {
    let lines = store.cart_lines(owner).await?;
    let ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
    let products = store.get_products(&ids).await?;

    let mut entries = Vec::with_capacity(lines.len());
    for line in &lines {
        // A product deleted from the catalog drops out of the view.
        let Some(product) = products.iter().find(|p| p.id == line.product_id) else {
            continue;
        };
        let unit_price = Money::new(product.unit_price, currency);
        entries.push(CartEntry {
            product_id: product.id,
            sku: product.sku.clone(),
            name: product.name.clone(),
            image_url: product.image_url.clone(),
            line_total: unit_price.multiply(line.quantity as u32),
            unit_price,
            quantity: line.quantity as u32,
            available: product.available(),
        });
    }
    Cart::build(owner, currency, entries)
}

pub async fn add_item(
    store: &dyn CommerceStore,
    currency: &str,
    owner: &str,
    product_id: Uuid,
    quantity: u32,
) -> Result<Cart> {
    if quantity == 0 {
        return Err(Error::Validation("quantity must be at least 1".into()));
    }
    let product = store
        .get_product(product_id)
        .await?
        .filter(|p| p.is_active())
        .ok_or(Error::NotFound("product"))?;

    let in_cart = store
        .cart_lines(owner)
        .await?
        .into_iter()
        .find(|l| l.product_id == product_id)
        .map(|l| l.quantity as u32)
        .unwrap_or(0);

    let requested = in_cart + quantity;
    if requested > product.available() {
        return Err(Error::OutOfStock { product_id, available: product.quantity });
    }
    store.upsert_cart_line(owner, product_id, requested).await?;
    view(store, currency, owner).await
}

/// Absolute set; zero removes the line.
pub async fn set_quantity(
    store: &dyn CommerceStore,
    currency: &str,
    owner: &str,
    product_id: Uuid,
    quantity: u32,
) -> Result<Cart> {
    if quantity == 0 {
        store.delete_cart_line(owner, product_id).await?;
        return view(store, currency, owner).await;
    }
    let product = store
        .get_product(product_id)
        .await?
        .filter(|p| p.is_active())
        .ok_or(Error::NotFound("product"))?;
    if quantity > product.available() {
        return Err(Error::OutOfStock { product_id, available: product.quantity });
    }
    store.upsert_cart_line(owner, product_id, quantity).await?;
    view(store, currency, owner).await
}

pub async fn remove_item(
    store: &dyn CommerceStore,
    currency: &str,
    owner: &str,
    product_id: Uuid,
) -> Result<Cart> {
    store.delete_cart_line(owner, product_id).await?;
    view(store, currency, owner).await
}

pub async fn clear(store: &dyn CommerceStore, owner: &str) -> Result<()> {
    store.clear_cart(owner).await
}

/// Folds an anonymous session cart into the authenticated user's cart.
/// The user's existing line wins per product; non-conflicting session
/// lines move over verbatim (checkout re-validates stock anyway). The
/// session cart is gone afterwards.
pub async fn merge_on_login(
    store: &dyn CommerceStore,
    currency: &str,
    session_owner: &str,
    user_owner: &str,
) -> Result<Cart> {
    let session_lines = store.cart_lines(session_owner).await?;
    let user_lines = store.cart_lines(user_owner).await?;

    for line in session_lines {
        let conflicts = user_lines.iter().any(|u| u.product_id == line.product_id);
        if !conflicts {
            store
                .upsert_cart_line(user_owner, line.product_id, line.quantity as u32)
                .await?;
        }
    }
    store.clear_cart(session_owner).await?;
    view(store, currency, user_owner).await
}
