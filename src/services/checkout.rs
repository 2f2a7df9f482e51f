//! Checkout orchestration: pricing quotes and the atomic order commit.

use crate::config::AppConfig;
use crate::domain::aggregates::order::{Address, Order, OrderItem, OrderTotals};
use crate::domain::aggregates::{PincodeRate, Product};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::{Money, Pincode};
use crate::error::{Error, Result};
use crate::events::EventPublisher;
use crate::store::{CommerceStore, OrderDraft};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub currency: String,
}

#[derive(Clone, Debug)]
pub struct PlaceOrder {
    pub cart_owner: String,
    pub email: String,
    pub payment_method: String,
    pub address: Address,
    /// The total the customer saw and confirmed. A catalog price change
    /// between quote and commit surfaces as `PriceChanged`, never as a
    /// silently different charge.
    pub confirmed_total: Decimal,
}

/// Pure given its inputs: same lines, rate and tax rate always price
/// identically. A zero shipping charge is a real free-shipping value.
pub fn compute_totals(
    lines: &[(Product, u32)],
    rate: &PincodeRate,
    tax_rate_percent: Decimal,
    currency: &str,
) -> Result<Totals> {
    let mut subtotal = Money::zero(currency);
    for (product, quantity) in lines {
        let line = Money::new(product.unit_price, currency).multiply(*quantity);
        subtotal = subtotal.add(&line)?;
    }
    let tax = subtotal.percent(tax_rate_percent);
    let shipping = Money::new(rate.shipping_charge, currency);
    let total = subtotal.add(&tax)?.add(&shipping)?;
    Ok(Totals {
        subtotal: subtotal.amount(),
        tax: tax.amount(),
        shipping: shipping.amount(),
        total: total.amount(),
        currency: currency.to_string(),
    })
}

/// Cart lines joined with their current catalog rows. Uses live prices,
/// never a cached cart price.
async fn priced_cart(store: &dyn CommerceStore, owner: &str) -> Result<Vec<(Product, u32)>> {
    let lines = store.cart_lines(owner).await?;
    if lines.is_empty() {
        return Err(Error::Validation("cart is empty".into()));
    }
    let ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
    let products = store.get_products(&ids).await?;

    let mut priced = Vec::with_capacity(lines.len());
    for line in &lines {
        let product = products
            .iter()
            .find(|p| p.id == line.product_id)
            .filter(|p| p.is_active())
            .ok_or(Error::NotFound("product"))?;
        priced.push((product.clone(), line.quantity as u32));
    }
    Ok(priced)
}

async fn serviceable_rate(store: &dyn CommerceStore, pincode: &str) -> Result<PincodeRate> {
    let code = Pincode::new(pincode)?;
    match store.get_pincode(code.as_str()).await? {
        Some(rate) if rate.active => Ok(rate),
        _ => Err(Error::UnserviceableArea(code.to_string())),
    }
}

pub async fn quote(
    store: &dyn CommerceStore,
    config: &AppConfig,
    cart_owner: &str,
    pincode: &str,
) -> Result<Totals> {
    let lines = priced_cart(store, cart_owner).await?;
    let rate = serviceable_rate(store, pincode).await?;
    compute_totals(&lines, &rate, config.tax_rate_percent, &config.currency)
}

/// The checkout commit. Re-prices the cart, verifies the confirmed
/// total, then hands the store an all-or-nothing commit that decrements
/// stock conditionally per line. Exactly one of two concurrent commits
/// competing for the last unit can succeed.
pub async fn place_order(
    store: &dyn CommerceStore,
    events: &EventPublisher,
    config: &AppConfig,
    user_id: &str,
    request: PlaceOrder,
) -> Result<Order> {
    let lines = priced_cart(store, &request.cart_owner).await?;
    let rate = serviceable_rate(store, &request.address.pincode).await?;
    let totals = compute_totals(&lines, &rate, config.tax_rate_percent, &config.currency)?;

    if totals.total != request.confirmed_total {
        return Err(Error::PriceChanged {
            confirmed: request.confirmed_total,
            current: totals.total,
        });
    }

    let order = Order::place(
        user_id,
        request.email,
        request.payment_method,
        OrderTotals {
            subtotal: totals.subtotal,
            tax: totals.tax,
            shipping: totals.shipping,
            total: totals.total,
        },
        &config.currency,
        request.address,
    );

    let items: Vec<OrderItem> = lines
        .iter()
        .map(|(product, quantity)| OrderItem {
            id: Uuid::new_v4(),
            order_id: order.id,
            product_id: product.id,
            sku: product.sku.clone(),
            name: product.name.clone(),
            quantity: *quantity as i32,
            unit_price: product.unit_price,
            line_total: product.unit_price * Decimal::from(*quantity),
        })
        .collect();

    let order = store
        .commit_order(OrderDraft { order, items }, &request.cart_owner)
        .await?;

    events
        .publish(DomainEvent::Order(OrderEvent::Placed {
            order_id: order.id,
            order_number: order.order_number.clone(),
            user_id: order.user_id.clone(),
            total: order.total,
        }))
        .await;
    tracing::info!(order = %order.order_number, total = %order.total, "order placed");
    Ok(order)
}
