//! Admin back office: catalog, pincode and contact CRUD plus order
//! management. Every handler requires the configured admin identity.

use super::{AdminUser, AppState, ListParams, PaginatedResponse};
use crate::domain::aggregates::order::{Order, OrderStatus};
use crate::domain::aggregates::{
    Category, ContactStatus, ContactSubmission, PincodeRate, Product, ProductStatus, Subcategory,
};
use crate::domain::events::{DomainEvent, StockEvent};
use crate::error::{Error, Result};
use crate::services;
use crate::store::Page;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::orders::OrderDetail;
use crate::domain::value_objects::{Pincode, Sku};

fn slugify(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}

// ----- categories -----

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryPayload {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: Option<i32>,
}

pub async fn list_categories(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.store.list_categories().await?))
}

pub async fn create_category(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<CategoryPayload>,
) -> Result<(StatusCode, Json<Category>)> {
    payload.validate().map_err(|e| Error::Validation(e.to_string()))?;
    let category = Category {
        id: Uuid::new_v4(),
        slug: slugify(&payload.name),
        name: payload.name,
        description: payload.description,
        image_url: payload.image_url,
        sort_order: payload.sort_order.unwrap_or(0),
        created_at: Utc::now(),
    };
    state.store.insert_category(&category).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryPayload>,
) -> Result<Json<Category>> {
    payload.validate().map_err(|e| Error::Validation(e.to_string()))?;
    let current = state.store.get_category(id).await?.ok_or(Error::NotFound("category"))?;
    let category = Category {
        id,
        slug: slugify(&payload.name),
        name: payload.name,
        description: payload.description,
        image_url: payload.image_url,
        sort_order: payload.sort_order.unwrap_or(current.sort_order),
        created_at: current.created_at,
    };
    state.store.update_category(&category).await?;
    Ok(Json(category))
}

/// Cascades: subcategories under this category and their products go
/// with it.
pub async fn delete_category(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.store.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----- subcategories -----

#[derive(Debug, Deserialize, Validate)]
pub struct SubcategoryPayload {
    pub category_id: Uuid,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct SubcategoryFilter {
    pub category_id: Option<Uuid>,
}

pub async fn list_subcategories(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(filter): Query<SubcategoryFilter>,
) -> Result<Json<Vec<Subcategory>>> {
    Ok(Json(state.store.list_subcategories(filter.category_id).await?))
}

pub async fn create_subcategory(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<SubcategoryPayload>,
) -> Result<(StatusCode, Json<Subcategory>)> {
    payload.validate().map_err(|e| Error::Validation(e.to_string()))?;
    if state.store.get_category(payload.category_id).await?.is_none() {
        return Err(Error::NotFound("category"));
    }
    let subcategory = Subcategory {
        id: Uuid::new_v4(),
        category_id: payload.category_id,
        slug: slugify(&payload.name),
        name: payload.name,
        description: payload.description,
        image_url: payload.image_url,
        sort_order: payload.sort_order.unwrap_or(0),
        created_at: Utc::now(),
    };
    state.store.insert_subcategory(&subcategory).await?;
    Ok((StatusCode::CREATED, Json(subcategory)))
}

pub async fn update_subcategory(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubcategoryPayload>,
) -> Result<Json<Subcategory>> {
    payload.validate().map_err(|e| Error::Validation(e.to_string()))?;
    let current = state.store.get_subcategory(id).await?.ok_or(Error::NotFound("subcategory"))?;
    if state.store.get_category(payload.category_id).await?.is_none() {
        return Err(Error::NotFound("category"));
    }
    let subcategory = Subcategory {
        id,
        category_id: payload.category_id,
        slug: slugify(&payload.name),
        name: payload.name,
        description: payload.description,
        image_url: payload.image_url,
        sort_order: payload.sort_order.unwrap_or(current.sort_order),
        created_at: current.created_at,
    };
    state.store.update_subcategory(&subcategory).await?;
    Ok(Json(subcategory))
}

pub async fn delete_subcategory(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.store.delete_subcategory(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----- products -----

#[derive(Debug, Deserialize, Validate)]
pub struct ProductPayload {
    pub subcategory_id: Uuid,
    pub sku: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Decimal,
    /// Initial stock; ignored on update, which keeps quantity on its
    /// dedicated paths.
    pub quantity: Option<u32>,
    pub sort_order: Option<i32>,
    pub image_url: Option<String>,
    pub attributes: Option<serde_json::Value>,
    pub status: Option<ProductStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ProductFilter {
    pub subcategory_id: Option<Uuid>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub async fn list_products(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<PaginatedResponse<Product>>> {
    let page = Page::new(filter.page, filter.per_page);
    let (data, total) = state
        .store
        .list_products(filter.subcategory_id, true, page)
        .await?;
    Ok(Json(PaginatedResponse { data, total, page: page.page }))
}

fn validate_price(price: Decimal) -> Result<()> {
    if price <= Decimal::ZERO {
        return Err(Error::Validation("unit price must be positive".into()));
    }
    Ok(())
}

pub async fn create_product(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> Result<(StatusCode, Json<Product>)> {
    payload.validate().map_err(|e| Error::Validation(e.to_string()))?;
    validate_price(payload.unit_price)?;
    if state.store.get_subcategory(payload.subcategory_id).await?.is_none() {
        return Err(Error::NotFound("subcategory"));
    }
    let sku = match payload.sku {
        Some(raw) => Sku::new(raw)?,
        None => Sku::generate(),
    };
    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4(),
        subcategory_id: payload.subcategory_id,
        sku: sku.into_inner(),
        name: payload.name,
        description: payload.description,
        unit_price: payload.unit_price,
        quantity: payload.quantity.unwrap_or(0) as i32,
        sort_order: payload.sort_order.unwrap_or(0),
        image_url: payload.image_url,
        attributes: payload.attributes.unwrap_or_else(|| serde_json::json!({})),
        status: payload.status.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };
    state.store.insert_product(&product).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<Product>> {
    payload.validate().map_err(|e| Error::Validation(e.to_string()))?;
    validate_price(payload.unit_price)?;
    let current = state.store.get_product(id).await?.ok_or(Error::NotFound("product"))?;
    if state.store.get_subcategory(payload.subcategory_id).await?.is_none() {
        return Err(Error::NotFound("subcategory"));
    }
    let sku = match payload.sku {
        Some(raw) => Sku::new(raw)?.into_inner(),
        None => current.sku.clone(),
    };
    let product = Product {
        id,
        subcategory_id: payload.subcategory_id,
        sku,
        name: payload.name,
        description: payload.description,
        unit_price: payload.unit_price,
        quantity: current.quantity,
        sort_order: payload.sort_order.unwrap_or(current.sort_order),
        image_url: payload.image_url,
        attributes: payload.attributes.unwrap_or(current.attributes),
        status: payload.status.unwrap_or(current.status),
        created_at: current.created_at,
        updated_at: Utc::now(),
    };
    state.store.update_product(&product).await?;
    // Re-read so the response reflects the stored quantity.
    state
        .store
        .get_product(id)
        .await?
        .map(Json)
        .ok_or(Error::NotFound("product"))
}

pub async fn delete_product(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.store.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct QuantityPayload {
    pub quantity: u32,
}

/// Absolute stock set, last-writer-wins; checkout decrements still race
/// safely because they are conditional at the storage layer.
pub async fn set_product_quantity(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuantityPayload>,
) -> Result<Json<Product>> {
    let product = state.store.set_product_quantity(id, payload.quantity).await?;
    state
        .events
        .publish(DomainEvent::Stock(StockEvent::AdminSet {
            product_id: id,
            quantity: payload.quantity,
        }))
        .await;
    Ok(Json(product))
}

// ----- pincode rates -----

#[derive(Debug, Deserialize, Validate)]
pub struct PincodePayload {
    pub code: String,
    #[validate(length(min = 1, max = 80))]
    pub city: String,
    #[validate(length(min = 1, max = 80))]
    pub state: String,
    #[validate(range(min = 1, max = 60))]
    pub delivery_days: i32,
    pub shipping_charge: Decimal,
    pub active: Option<bool>,
}

pub async fn list_pincodes(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<PincodeRate>>> {
    Ok(Json(state.store.list_pincodes().await?))
}

pub async fn create_pincode(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<PincodePayload>,
) -> Result<(StatusCode, Json<PincodeRate>)> {
    payload.validate().map_err(|e| Error::Validation(e.to_string()))?;
    let code = Pincode::new(&payload.code)?;
    if payload.shipping_charge < Decimal::ZERO {
        return Err(Error::Validation("shipping charge must not be negative".into()));
    }
    if state.store.get_pincode(code.as_str()).await?.is_some() {
        return Err(Error::Conflict(format!("pincode {code} already exists")));
    }
    let rate = PincodeRate {
        code: code.as_str().to_string(),
        city: payload.city,
        state: payload.state,
        delivery_days: payload.delivery_days,
        shipping_charge: payload.shipping_charge,
        active: payload.active.unwrap_or(true),
        created_at: Utc::now(),
    };
    state.store.insert_pincode(&rate).await?;
    Ok((StatusCode::CREATED, Json(rate)))
}

pub async fn update_pincode(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(payload): Json<PincodePayload>,
) -> Result<Json<PincodeRate>> {
    payload.validate().map_err(|e| Error::Validation(e.to_string()))?;
    if payload.shipping_charge < Decimal::ZERO {
        return Err(Error::Validation("shipping charge must not be negative".into()));
    }
    let current = state.store.get_pincode(&code).await?.ok_or(Error::NotFound("pincode"))?;
    let rate = PincodeRate {
        code: current.code,
        city: payload.city,
        state: payload.state,
        delivery_days: payload.delivery_days,
        shipping_charge: payload.shipping_charge,
        active: payload.active.unwrap_or(current.active),
        created_at: current.created_at,
    };
    state.store.update_pincode(&rate).await?;
    Ok(Json(rate))
}

pub async fn delete_pincode(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode> {
    state.store.delete_pincode(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----- contact submissions -----

pub async fn list_contacts(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedResponse<ContactSubmission>>> {
    let page = Page::new(params.page, params.per_page);
    let (data, total) = state.store.list_contacts(page).await?;
    Ok(Json(PaginatedResponse { data, total, page: page.page }))
}

#[derive(Debug, Deserialize)]
pub struct ContactStatusPayload {
    pub status: ContactStatus,
}

pub async fn update_contact_status(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ContactStatusPayload>,
) -> Result<Json<ContactSubmission>> {
    Ok(Json(state.store.update_contact_status(id, payload.status).await?))
}

pub async fn delete_contact(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.store.delete_contact(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----- orders -----

pub async fn list_orders(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedResponse<Order>>> {
    let page = Page::new(params.page, params.per_page);
    let (data, total) = state.store.list_orders(page).await?;
    Ok(Json(PaginatedResponse { data, total, page: page.page }))
}

pub async fn get_order(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderDetail>> {
    let order = state.store.get_order(id).await?.ok_or(Error::NotFound("order"))?;
    let items = state.store.order_items(id).await?;
    Ok(Json(OrderDetail { order, items }))
}

#[derive(Debug, Deserialize)]
pub struct OrderStatusPayload {
    pub status: OrderStatus,
}

pub async fn update_order_status(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<OrderStatusPayload>,
) -> Result<Json<Order>> {
    let order =
        services::orders::transition(state.store.as_ref(), &state.events, id, payload.status)
            .await?;
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
pub struct OrderNotesPayload {
    pub notes: Option<String>,
}

pub async fn set_order_notes(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<OrderNotesPayload>,
) -> Result<Json<Order>> {
    Ok(Json(state.store.set_order_notes(id, payload.notes).await?))
}

/// Hard delete; restricted to closed orders and never restores stock.
pub async fn delete_order(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    services::orders::delete(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
