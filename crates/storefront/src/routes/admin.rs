//! Admin route handlers: discount code issuance and store statistics.
//!
//! These endpoints are unauthenticated.

use axum::{Json, extract::State};
use checkout_lane_core::{DiscountRate, StoreStats};
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

/// Response of `POST /api/admin/discount/generate`.
///
/// `code` is `null` when the next order is not an Nth order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDiscountResponse {
    pub code: Option<String>,
    pub discount_percentage: DiscountRate,
    pub message: String,
}

/// Issue (or re-issue) the code for the next order, if it is eligible.
#[instrument(skip(state))]
pub async fn generate_discount(
    State(state): State<AppState>,
) -> Result<Json<GenerateDiscountResponse>> {
    let store = state.store();
    let code = store.generate_discount_code()?;

    let message = if code.is_some() {
        "Discount code generated. It applies to the next order only.".to_string()
    } else {
        format!(
            "Code not available. Next order is not a multiple of {}.",
            store.policy().every_nth()
        )
    };

    Ok(Json(GenerateDiscountResponse {
        code,
        discount_percentage: store.discount_rate(),
        message,
    }))
}

/// Order totals and every issued code.
#[instrument(skip(state))]
pub async fn stats(State(state): State<AppState>) -> Result<Json<StoreStats>> {
    Ok(Json(state.store().stats()?))
}
