//! Shopper-facing discount code validation.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use checkout_lane_core::DiscountRate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Body of `POST /api/discount/validate`.
#[derive(Debug, Deserialize)]
pub struct ValidateDiscountRequest {
    pub code: Option<String>,
}

/// Response of `POST /api/discount/validate`.
///
/// Serializes as `{valid: true, discountPercentage}` or `{valid: false, message}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateDiscountResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<DiscountRate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Check whether a code would apply to the next order. Does not redeem it.
#[instrument(skip(state, payload))]
pub async fn validate(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ValidateDiscountRequest>, JsonRejection>,
) -> Result<Json<ValidateDiscountResponse>> {
    let Json(request) = payload?;

    let code = request
        .code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::BadRequest("Discount code is required".to_string()))?;

    let response = match state.store().validate_discount_code(code)? {
        Ok(rate) => ValidateDiscountResponse {
            valid: true,
            discount_percentage: Some(rate),
            message: None,
        },
        Err(rejection) => ValidateDiscountResponse {
            valid: false,
            discount_percentage: None,
            message: Some(rejection.to_string()),
        },
    };

    Ok(Json(response))
}
