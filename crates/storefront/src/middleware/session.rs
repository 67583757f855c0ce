//! Session identification.
//!
//! Carts are keyed by an opaque client-chosen session ID sent in the
//! `x-session-id` header. There are no cookies and no server-side sessions.

use axum::{extract::FromRequestParts, http::request::Parts};
use checkout_lane_core::SessionId;
use tracing::Span;

use crate::error::AppError;

/// The HTTP header name carrying the session ID.
pub const SESSION_ID_HEADER: &str = "x-session-id";

/// Extractor that requires a valid `x-session-id` header.
///
/// Rejects with 400 when the header is missing, not ASCII, blank, or too long.
#[derive(Debug, Clone)]
pub struct SessionHeader(pub SessionId);

impl<S> FromRequestParts<S> for SessionHeader
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(SESSION_ID_HEADER)
            .ok_or_else(|| AppError::BadRequest(format!("Missing {SESSION_ID_HEADER} header")))?
            .to_str()
            .map_err(|_| AppError::BadRequest(format!("Invalid {SESSION_ID_HEADER} header")))?;

        let session = SessionId::parse(raw)
            .map_err(|e| AppError::BadRequest(format!("Invalid {SESSION_ID_HEADER} header: {e}")))?;

        Span::current().record("session_id", session.as_str());
        Ok(Self(session))
    }
}
