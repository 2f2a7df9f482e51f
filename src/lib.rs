//! Fastenkart Storefront Service
//!
//! Backend for an industrial-fasteners storefront.
//!
//! ## Features
//! - Catalog hierarchy (categories, subcategories, products)
//! - Stock-aware shopping cart with login merge
//! - Checkout with pincode shipping, tax and atomic stock commit
//! - Order lifecycle with idempotent payment callback
//! - Admin back office (catalog, pincodes, orders, contact inbox)

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod services;
pub mod store;

pub use config::AppConfig;
pub use error::{Error, Result};
