//! Product catalog route handlers.

use axum::{Json, extract::State};
use checkout_lane_core::Product;
use tracing::instrument;

use crate::state::AppState;

/// List every product in catalog order.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.store().products().to_vec())
}
