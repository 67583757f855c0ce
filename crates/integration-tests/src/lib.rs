//! Integration test harness for Checkout Lane.
//!
//! Tests drive the real storefront router in-process with
//! `tower::ServiceExt::oneshot`; no socket is bound.
//!
//! ```rust,ignore
//! let app = TestApp::new();
//! let response = app.post_json("/api/cart", Some("s1"), &json!({"productId": "1"})).await;
//! assert_eq!(response.status, StatusCode::OK);
//! ```

use std::path::Path;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use checkout_lane_core::{Catalog, DiscountPolicy, DiscountRate, Store};
use checkout_lane_storefront::{middleware::SESSION_ID_HEADER, state::AppState};
use serde_json::Value;
use tower::ServiceExt;

fn embedded_catalog() -> Catalog {
    Catalog::embedded().expect("embedded catalog is valid")
}

/// A fresh in-memory store behind the full router.
pub struct TestApp {
    router: Router,
}

/// A decoded response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Body parsed as JSON; `Value::Null` if it is not JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    /// Body as UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Embedded catalog, default policy (every 3rd order, 10% off).
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(DiscountPolicy::default())
    }

    /// Embedded catalog with a custom threshold and rate.
    ///
    /// # Panics
    ///
    /// Panics if the threshold is zero or the rate is not a valid fraction.
    #[must_use]
    pub fn with_discount(every_nth: u64, rate: &str) -> Self {
        let rate: DiscountRate = rate.parse().expect("valid discount rate");
        let policy = DiscountPolicy::new(every_nth, rate).expect("valid threshold");
        Self::with_policy(policy)
    }

    /// A catalog given as JSON, default policy.
    ///
    /// # Panics
    ///
    /// Panics if the catalog is invalid.
    #[must_use]
    pub fn with_catalog_json(json: &str) -> Self {
        let catalog = Catalog::from_json(json).expect("valid catalog");
        Self::build(catalog, DiscountPolicy::default(), None)
    }

    /// Serve `static_dir` for non-API paths.
    #[must_use]
    pub fn with_static_dir(static_dir: &Path) -> Self {
        Self::build(
            embedded_catalog(),
            DiscountPolicy::default(),
            Some(static_dir),
        )
    }

    fn with_policy(policy: DiscountPolicy) -> Self {
        Self::build(embedded_catalog(), policy, None)
    }

    fn build(catalog: Catalog, policy: DiscountPolicy, static_dir: Option<&Path>) -> Self {
        let state = AppState::new(Store::in_memory(catalog, policy));
        Self {
            router: checkout_lane_storefront::app(state, static_dir),
        }
    }

    /// Send a request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        session: Option<&str>,
        body: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(session) = session {
            builder = builder.header(SESSION_ID_HEADER, session);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_owned())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("valid request"))
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body")
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// `GET` with an optional session header.
    pub async fn get(&self, uri: &str, session: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, session, None).await
    }

    /// `POST` a JSON value with an optional session header.
    pub async fn post_json(&self, uri: &str, session: Option<&str>, body: &Value) -> TestResponse {
        self.send(Method::POST, uri, session, Some(&body.to_string()))
            .await
    }

    /// `POST /api/cart` and assert success.
    ///
    /// # Panics
    ///
    /// Panics if the item is not added.
    pub async fn add_to_cart(&self, session: &str, product_id: &str, quantity: i64) {
        let response = self
            .post_json(
                "/api/cart",
                Some(session),
                &serde_json::json!({ "productId": product_id, "quantity": quantity }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    }

    /// `POST /api/checkout` with an optional code.
    pub async fn checkout(&self, session: &str, code: Option<&str>) -> TestResponse {
        let body = code.map_or_else(
            || serde_json::json!({}),
            |code| serde_json::json!({ "discountCode": code }),
        );
        self.post_json("/api/checkout", Some(session), &body).await
    }

    /// Place a one-item order for `session`.
    ///
    /// # Panics
    ///
    /// Panics if the order is not placed.
    pub async fn place_order(&self, session: &str, product_id: &str) {
        self.add_to_cart(session, product_id, 1).await;
        let response = self.checkout(session, None).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    }

    /// `POST /api/admin/discount/generate`, returning the code if any.
    pub async fn generate_code(&self) -> Option<String> {
        let response = self
            .send(Method::POST, "/api/admin/discount/generate", None, None)
            .await;
        response.json()["code"].as_str().map(str::to_owned)
    }
}
