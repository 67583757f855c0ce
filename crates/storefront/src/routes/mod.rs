//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Health check
//!
//! # Catalog
//! GET  /api/products                 - Product listing
//!
//! # Cart (requires x-session-id)
//! GET  /api/cart                     - Session cart
//! POST /api/cart                     - Add to cart
//!
//! # Checkout (requires x-session-id)
//! POST /api/checkout                 - Place order, optional discount code
//!
//! # Discounts
//! POST /api/discount/validate        - Check a code against the next order
//!
//! # Admin
//! POST /api/admin/discount/generate  - Issue code for the next Nth order
//! GET  /api/admin/stats              - Order totals and issued codes
//! ```

pub mod admin;
pub mod cart;
pub mod checkout;
pub mod discount;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::error::AppError;
use crate::state::AppState;

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/discount/generate", post(admin::generate_discount))
        .route("/stats", get(admin::stats))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/cart", get(cart::show).post(cart::add))
        .route("/checkout", post(checkout::checkout))
        .route("/discount/validate", post(discount::validate))
        .nest("/admin", admin_routes())
        .fallback(api_not_found)
}

/// Create the main router with all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Unknown API paths get a JSON 404 instead of the UI fallback.
async fn api_not_found() -> AppError {
    AppError::NotFound("No such API endpoint".to_string())
}
