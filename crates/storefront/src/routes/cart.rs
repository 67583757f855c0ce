//! Cart route handlers.
//!
//! Carts are keyed by the `x-session-id` header and created on first use.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use checkout_lane_core::{CartLine, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::SessionHeader;
use crate::state::AppState;

/// Body of `POST /api/cart`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: Option<String>,
    /// Defaults to 1 when omitted.
    pub quantity: Option<i64>,
}

/// Response of `POST /api/cart`.
#[derive(Debug, Serialize)]
pub struct AddToCartResponse {
    pub message: String,
    pub cart: Vec<CartLine>,
}

/// Show the session's cart.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    SessionHeader(session): SessionHeader,
) -> Result<Json<Vec<CartLine>>> {
    Ok(Json(state.store().cart(&session)?))
}

/// Add a product to the session's cart, merging with an existing line.
#[instrument(skip(state, payload))]
pub async fn add(
    State(state): State<AppState>,
    SessionHeader(session): SessionHeader,
    payload: std::result::Result<Json<AddToCartRequest>, JsonRejection>,
) -> Result<Json<AddToCartResponse>> {
    let Json(request) = payload?;

    let product_id = request
        .product_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ProductId::new)
        .ok_or_else(|| AppError::BadRequest("productId is required".to_string()))?;
    let quantity = request.quantity.unwrap_or(1);

    let cart = state.store().add_to_cart(&session, &product_id, quantity)?;

    Ok(Json(AddToCartResponse {
        message: "Product added to cart".to_string(),
        cart,
    }))
}
