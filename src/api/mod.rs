//! HTTP surface: public storefront routes, payment webhook and the
//! admin back office.

mod admin;
mod cart;
mod catalog;
mod checkout;
mod contact;
mod orders;

use crate::config::AppConfig;
use crate::error::Error;
use crate::events::EventPublisher;
use crate::store::CommerceStore;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CommerceStore>,
    pub config: Arc<AppConfig>,
    pub events: EventPublisher,
}

/// Caller identity forwarded by the auth proxy. The service only needs
/// a stable user id and, for back-office routes, the admin email.
#[derive(Clone, Debug, Default)]
pub struct Identity {
    pub user_id: Option<String>,
    pub email: Option<String>,
}

impl Identity {
    pub fn require_user(&self) -> Result<&str, Error> {
        self.user_id.as_deref().ok_or(Error::Unauthorized)
    }

    pub fn is_admin(&self, config: &AppConfig) -> bool {
        self.email
            .as_deref()
            .is_some_and(|e| e.eq_ignore_ascii_case(&config.admin_email))
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Ok(Self { user_id: header("x-user-id"), email: header("x-user-email") })
    }
}

/// Extractor that rejects anyone but the configured admin.
pub struct AdminUser {
    pub email: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let identity = match Identity::from_request_parts(parts, state).await {
            Ok(identity) => identity,
            Err(never) => match never {},
        };
        match identity.email {
            Some(email) if email.eq_ignore_ascii_case(&state.config.admin_email) => {
                Ok(AdminUser { email })
            }
            _ => Err(Error::Unauthorized),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy", "service": "fastenkart"}))
}

pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/categories", get(catalog::list_categories))
        .route("/categories/:id", get(catalog::get_category))
        .route("/categories/:id/subcategories", get(catalog::list_subcategories))
        .route("/subcategories/:id/products", get(catalog::list_subcategory_products))
        .route("/products/:id", get(catalog::get_product))
        .route("/pincodes/:code", get(catalog::check_pincode))
        .route("/contact", post(contact::submit))
        .route("/cart/:owner", get(cart::get_cart).delete(cart::clear_cart))
        .route("/cart/:owner/items", post(cart::add_item))
        .route(
            "/cart/:owner/items/:product_id",
            put(cart::set_quantity).delete(cart::remove_item),
        )
        .route("/cart/merge", post(cart::merge))
        .route("/checkout/quote", post(checkout::quote))
        .route("/checkout", post(checkout::place_order))
        .route("/payments/callback", post(checkout::payment_callback))
        .route("/orders", get(orders::list_my_orders))
        .route("/orders/:id", get(orders::get_order))
        .route("/orders/:id/invoice", get(orders::get_invoice));

    let admin_routes = Router::new()
        .route("/categories", get(admin::list_categories).post(admin::create_category))
        .route("/categories/:id", put(admin::update_category).delete(admin::delete_category))
        .route("/subcategories", get(admin::list_subcategories).post(admin::create_subcategory))
        .route(
            "/subcategories/:id",
            put(admin::update_subcategory).delete(admin::delete_subcategory),
        )
        .route("/products", get(admin::list_products).post(admin::create_product))
        .route("/products/:id", put(admin::update_product).delete(admin::delete_product))
        .route("/products/:id/quantity", put(admin::set_product_quantity))
        .route("/pincodes", get(admin::list_pincodes).post(admin::create_pincode))
        .route("/pincodes/:code", put(admin::update_pincode).delete(admin::delete_pincode))
        .route("/contacts", get(admin::list_contacts))
        .route("/contacts/:id/status", put(admin::update_contact_status))
        .route("/contacts/:id", delete(admin::delete_contact))
        .route("/orders", get(admin::list_orders))
        .route("/orders/:id", get(admin::get_order).delete(admin::delete_order))
        .route("/orders/:id/status", put(admin::update_order_status))
        .route("/orders/:id/notes", put(admin::set_order_notes));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", public)
        .nest("/api/v1/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
