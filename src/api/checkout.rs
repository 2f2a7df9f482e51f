//! Checkout endpoints and the payment-gateway webhook.

use super::{AppState, Identity};
use crate::domain::aggregates::order::{Address, Order};
use crate::error::{Error, Result};
use crate::services;
use crate::services::checkout::{PlaceOrder, Totals};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct QuoteRequest {
    #[validate(length(min = 1))]
    pub cart_owner: String,
    #[validate(length(equal = 6))]
    pub pincode: String,
}

pub async fn quote(
    State(state): State<AppState>,
    Json(payload): Json<QuoteRequest>,
) -> Result<Json<Totals>> {
    payload.validate().map_err(|e| Error::Validation(e.to_string()))?;
    let totals = services::checkout::quote(
        state.store.as_ref(),
        &state.config,
        &payload.cart_owner,
        &payload.pincode,
    )
    .await?;
    Ok(Json(totals))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddressPayload {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 6, max = 20))]
    pub phone: String,
    #[validate(length(min = 1, max = 200))]
    pub street1: String,
    pub street2: Option<String>,
    #[validate(length(min = 1, max = 80))]
    pub city: String,
    #[validate(length(min = 1, max = 80))]
    pub state: String,
    #[validate(length(equal = 6))]
    pub pincode: String,
}

impl From<AddressPayload> for Address {
    fn from(p: AddressPayload) -> Self {
        Address {
            name: p.name,
            phone: p.phone,
            street1: p.street1,
            street2: p.street2,
            city: p.city,
            state: p.state,
            pincode: p.pincode,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct PlaceOrderRequest {
    /// Session whose cart is being checked out; defaults to the user id.
    pub cart_owner: Option<String>,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 40))]
    pub payment_method: String,
    #[validate]
    pub address: AddressPayload,
    /// The total shown to and confirmed by the customer.
    pub confirmed_total: Decimal,
}

pub async fn place_order(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    payload.validate().map_err(|e| Error::Validation(e.to_string()))?;
    let user_id = identity.require_user()?.to_string();
    let request = PlaceOrder {
        cart_owner: payload.cart_owner.unwrap_or_else(|| user_id.clone()),
        email: payload.email,
        payment_method: payload.payment_method,
        address: payload.address.into(),
        confirmed_total: payload.confirmed_total,
    };
    let order = services::checkout::place_order(
        state.store.as_ref(),
        &state.events,
        &state.config,
        &user_id,
        request,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[derive(Debug, Deserialize)]
pub struct PaymentCallbackRequest {
    pub order_id: Uuid,
    pub reference: String,
    /// `success` or `failed`, as reported by the gateway.
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentCallbackResponse {
    pub order_id: Uuid,
    pub applied: bool,
}

/// Gateway webhook. Delivery is at-least-once; replays acknowledge
/// without re-applying.
pub async fn payment_callback(
    State(state): State<AppState>,
    Json(payload): Json<PaymentCallbackRequest>,
) -> Result<Json<PaymentCallbackResponse>> {
    if payload.status != "success" {
        tracing::warn!(order_id = %payload.order_id, status = %payload.status, "payment failed at gateway");
        return Ok(Json(PaymentCallbackResponse { order_id: payload.order_id, applied: false }));
    }
    let ack = services::orders::mark_paid(
        state.store.as_ref(),
        &state.events,
        payload.order_id,
        &payload.reference,
    )
    .await?;
    Ok(Json(PaymentCallbackResponse { order_id: ack.order.id, applied: ack.applied }))
}
