//! Cart endpoints. The owner segment is an opaque token: an anonymous
//! session id before login, the user id after.

use super::{AppState, Identity};
use crate::domain::aggregates::cart::Cart;
use crate::error::{Error, Result};
use crate::services;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

pub async fn get_cart(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<Cart>> {
    let cart = services::cart::view(state.store.as_ref(), &state.config.currency, &owner).await?;
    Ok(Json(cart))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: u32,
}

pub async fn add_item(
    State(state): State<AppState>,
    Path(owner): Path<String>,
    Json(payload): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<Cart>)> {
    payload.validate().map_err(|e| Error::Validation(e.to_string()))?;
    let cart = services::cart::add_item(
        state.store.as_ref(),
        &state.config.currency,
        &owner,
        payload.product_id,
        payload.quantity,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(cart)))
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: u32,
}

pub async fn set_quantity(
    State(state): State<AppState>,
    Path((owner, product_id)): Path<(String, Uuid)>,
    Json(payload): Json<SetQuantityRequest>,
) -> Result<Json<Cart>> {
    let cart = services::cart::set_quantity(
        state.store.as_ref(),
        &state.config.currency,
        &owner,
        product_id,
        payload.quantity,
    )
    .await?;
    Ok(Json(cart))
}

pub async fn remove_item(
    State(state): State<AppState>,
    Path((owner, product_id)): Path<(String, Uuid)>,
) -> Result<Json<Cart>> {
    let cart = services::cart::remove_item(
        state.store.as_ref(),
        &state.config.currency,
        &owner,
        product_id,
    )
    .await?;
    Ok(Json(cart))
}

pub async fn clear_cart(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<StatusCode> {
    services::cart::clear(state.store.as_ref(), &owner).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, Validate)]
pub struct MergeRequest {
    #[validate(length(min = 1))]
    pub session_id: String,
}

/// Called once after login to fold the anonymous cart into the user's.
pub async fn merge(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<MergeRequest>,
) -> Result<Json<Cart>> {
    payload.validate().map_err(|e| Error::Validation(e.to_string()))?;
    let user_id = identity.require_user()?.to_string();
    let cart = services::cart::merge_on_login(
        state.store.as_ref(),
        &state.config.currency,
        &payload.session_id,
        &user_id,
    )
    .await?;
    Ok(Json(cart))
}
