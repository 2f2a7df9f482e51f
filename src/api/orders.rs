//! Customer order history and invoices.

use super::{AppState, Identity};
use crate::domain::aggregates::order::{Order, OrderItem};
use crate::error::Result;
use crate::services;
use crate::services::invoice::Invoice;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

pub async fn list_my_orders(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<Order>>> {
    let user_id = identity.require_user()?;
    Ok(Json(state.store.list_orders_for_user(user_id).await?))
}

pub async fn get_order(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderDetail>> {
    let user_id = identity.require_user()?.to_string();
    let is_admin = identity.is_admin(&state.config);
    let (order, items) =
        services::orders::fetch_detail(state.store.as_ref(), &user_id, is_admin, id).await?;
    Ok(Json(OrderDetail { order, items }))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Invoice>> {
    let user_id = identity.require_user()?.to_string();
    let is_admin = identity.is_admin(&state.config);
    let (order, items) =
        services::orders::fetch_detail(state.store.as_ref(), &user_id, is_admin, id).await?;
    Ok(Json(services::invoice::build(&order, &items)?))
}
