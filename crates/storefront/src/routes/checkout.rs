//! Checkout route handler.

use axum::{Json, body::Bytes, extract::State};
use checkout_lane_core::Order;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::SessionHeader;
use crate::state::AppState;

/// Body of `POST /api/checkout`. The body itself may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub discount_code: Option<String>,
}

/// Response of `POST /api/checkout`.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub message: String,
    pub order: Order,
}

/// Turn the session's cart into an order, applying an optional discount code.
#[instrument(skip(state, body))]
pub async fn checkout(
    State(state): State<AppState>,
    SessionHeader(session): SessionHeader,
    body: Bytes,
) -> Result<Json<CheckoutResponse>> {
    let request = parse_optional_body(&body)?;

    let order = state
        .store()
        .checkout(&session, request.discount_code.as_deref())?;

    let message = if order.discount.is_some() {
        "Order placed successfully with discount"
    } else {
        "Order placed successfully"
    };

    Ok(Json(CheckoutResponse {
        message: message.to_string(),
        order,
    }))
}

/// An empty body means "no discount code".
fn parse_optional_body(body: &[u8]) -> Result<CheckoutRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CheckoutRequest::default());
    }

    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))
}
