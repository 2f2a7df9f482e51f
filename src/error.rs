//! Service error type and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum Error {
    /// Cart-time rejection: requested quantity exceeds live stock.
    #[error("requested quantity exceeds available stock for product {product_id}")]
    OutOfStock { product_id: Uuid, available: i32 },

    /// Checkout-time rejection: the atomic commit found too little stock.
    #[error("insufficient stock for product {product_id}")]
    InsufficientStock { product_id: Uuid },

    #[error("pincode {0} is not serviceable")]
    UnserviceableArea(String),

    /// The catalog price moved between quote and commit.
    #[error("price changed: confirmed {confirmed}, current {current}")]
    PriceChanged { confirmed: Decimal, current: Decimal },

    #[error("unauthorized")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl Error {
    fn code(&self) -> (StatusCode, &'static str) {
        match self {
            Error::OutOfStock { .. } => (StatusCode::CONFLICT, "out_of_stock"),
            Error::InsufficientStock { .. } => (StatusCode::CONFLICT, "insufficient_stock"),
            Error::UnserviceableArea(_) => (StatusCode::UNPROCESSABLE_ENTITY, "unserviceable_area"),
            Error::PriceChanged { .. } => (StatusCode::CONFLICT, "price_changed"),
            Error::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Error::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            Error::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            Error::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error) = self.code();
        let message = match &self {
            // Do not leak storage internals to clients.
            Error::Storage(e) => {
                tracing::error!(error = ?e, "storage failure");
                "storage operation failed".to_string()
            }
            Error::Config(e) => {
                tracing::error!(error = %e, "configuration failure");
                "service misconfigured".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Error::Unauthorized.code().0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::UnserviceableArea("110011".into()).code().0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            Error::InsufficientStock { product_id: Uuid::nil() }.code().1,
            "insufficient_stock"
        );
    }
}
