//! Public catalog browsing: read-only, sorted by the explicit sort key.

use super::{AppState, ListParams, PaginatedResponse};
use crate::domain::aggregates::{Category, PincodeRate, Product, Subcategory};
use crate::error::{Error, Result};
use crate::store::Page;
use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.store.list_categories().await?))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>> {
    state
        .store
        .get_category(id)
        .await?
        .map(Json)
        .ok_or(Error::NotFound("category"))
}

pub async fn list_subcategories(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Subcategory>>> {
    if state.store.get_category(id).await?.is_none() {
        return Err(Error::NotFound("category"));
    }
    Ok(Json(state.store.list_subcategories(Some(id)).await?))
}

pub async fn list_subcategory_products(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedResponse<Product>>> {
    if state.store.get_subcategory(id).await?.is_none() {
        return Err(Error::NotFound("subcategory"));
    }
    let page = Page::new(params.page, params.per_page);
    let (data, total) = state.store.list_products(Some(id), false, page).await?;
    Ok(Json(PaginatedResponse { data, total, page: page.page }))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>> {
    state
        .store
        .get_product(id)
        .await?
        .filter(|p| p.is_active())
        .map(Json)
        .ok_or(Error::NotFound("product"))
}

/// Serviceability probe used by the pincode widget on the cart page.
pub async fn check_pincode(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<PincodeRate>> {
    match state.store.get_pincode(&code).await? {
        Some(rate) if rate.active => Ok(Json(rate)),
        _ => Err(Error::UnserviceableArea(code)),
    }
}
