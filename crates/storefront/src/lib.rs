//! Checkout Lane Storefront library.
//!
//! The HTTP layer over [`checkout_lane_core::Store`]. Exposed as a library so
//! the router can be exercised in-process by the integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use std::path::Path;
use std::time::Duration;

use axum::{Router, body::Body, http::Request, response::Response};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::Span;

use crate::state::AppState;

/// Build the full application router.
///
/// When `static_dir` is given, paths outside `/api` and `/health` are served
/// from it, with `index.html` as the fallback for client-side routes.
pub fn app(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut router = routes::routes().with_state(state);

    if let Some(dir) = static_dir {
        let index = ServeFile::new(dir.join("index.html"));
        router = router.fallback_service(ServeDir::new(dir).fallback(index));
    }

    router
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        session_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    tracing::info!(parent: span, "response");
                }),
        )
        .layer(CorsLayer::permissive())
}
