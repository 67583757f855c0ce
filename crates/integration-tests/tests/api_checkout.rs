//! Integration tests for checkout, discount codes, and admin stats.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use checkout_lane_integration_tests::TestApp;
use serde_json::json;

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_checkout_without_code() {
    let app = TestApp::new();
    app.add_to_cart("s1", "4", 2).await;
    app.add_to_cart("s1", "5", 1).await;

    let response = app.checkout("s1", None).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());

    let body = response.json();
    assert!(body["message"].is_string());
    let order = &body["order"];
    assert_eq!(order["sessionId"], "s1");
    assert_eq!(order["subtotalAmount"], 285.0);
    assert_eq!(order["totalAmount"], 285.0);
    assert!(order.get("discount").is_none());
    assert_eq!(
        order["items"],
        json!([
            { "productId": "4", "price": 120.0, "quantity": 2 },
            { "productId": "5", "price": 45.0, "quantity": 1 },
        ])
    );
    assert!(order["id"].as_str().is_some());
    assert!(order["createdAt"].as_str().is_some());

    // Cart is emptied after a successful order
    assert_eq!(app.get("/api/cart", Some("s1")).await.json(), json!([]));
}

#[tokio::test]
async fn test_checkout_with_empty_body() {
    let app = TestApp::new();
    app.add_to_cart("s1", "5", 1).await;

    let response = app
        .send(Method::POST, "/api/checkout", Some("s1"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    assert_eq!(response.json()["order"]["totalAmount"], 45.0);
}

#[tokio::test]
async fn test_checkout_empty_cart() {
    let app = TestApp::new();

    let response = app.checkout("s1", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Cart is empty");

    let stats = app.get("/api/admin/stats", None).await.json();
    assert_eq!(stats["totalOrders"], 0);
}

#[tokio::test]
async fn test_checkout_requires_session() {
    let app = TestApp::new();

    let response = app.post_json("/api/checkout", None, &json!({})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blank_code_is_treated_as_no_code() {
    let app = TestApp::new();
    app.add_to_cart("s1", "5", 1).await;

    let response = app.checkout("s1", Some("   ")).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    assert_eq!(response.json()["order"]["totalAmount"], 45.0);
}

// =============================================================================
// Every-Nth-order discount
// =============================================================================

#[tokio::test]
async fn test_generate_before_nth_order() {
    let app = TestApp::new();

    let response = app
        .send(Method::POST, "/api/admin/discount/generate", None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    let message = body["message"].as_str().unwrap();
    assert!(body["code"].is_null());
    assert_eq!(body["discountPercentage"], 0.1);
    assert!(message.starts_with("Code not available"));
}

#[tokio::test]
async fn test_third_order_discount_scenario() {
    let app = TestApp::new();
    app.place_order("a", "5").await;
    app.place_order("b", "4").await;

    let code = app.generate_code().await.unwrap();
    assert!(code.starts_with("DISCOUNT_3_"));
    assert_eq!(app.generate_code().await.as_deref(), Some(code.as_str()));

    let validation = app
        .post_json("/api/discount/validate", None, &json!({ "code": code }))
        .await;
    assert_eq!(validation.status, StatusCode::OK);
    assert_eq!(
        validation.json(),
        json!({ "valid": true, "discountPercentage": 0.1 })
    );

    app.add_to_cart("c", "4", 2).await;
    let response = app.checkout("c", Some(&code)).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());

    let order = &response.json()["order"];
    assert_eq!(order["subtotalAmount"], 240.0);
    assert_eq!(order["discount"]["code"], code.as_str());
    assert_eq!(order["discount"]["amount"], 24.0);
    assert_eq!(order["totalAmount"], 216.0);

    let stats = app.get("/api/admin/stats", None).await.json();
    assert_eq!(stats["totalOrders"], 3);
    assert_eq!(stats["totalPurchaseAmount"], 381.0);
    assert_eq!(stats["totalDiscountAmount"], 24.0);
    assert_eq!(
        stats["discountCodes"],
        json!([{ "code": code, "isUsed": true, "orderIndexCondition": 3 }])
    );

    // A used code never validates again
    let validation = app
        .post_json("/api/discount/validate", None, &json!({ "code": code }))
        .await
        .json();
    assert_eq!(validation["valid"], false);
    assert_eq!(validation["message"], "Discount code has already been used");
}

#[tokio::test]
async fn test_reusing_code_fails_and_keeps_cart() {
    let app = TestApp::with_discount(1, "0.10");
    let code = app.generate_code().await.unwrap();

    app.add_to_cart("s1", "5", 1).await;
    assert_eq!(app.checkout("s1", Some(&code)).await.status, StatusCode::OK);

    app.add_to_cart("s1", "5", 1).await;
    let response = app.checkout("s1", Some(&code)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json()["error"],
        "Discount code has already been used"
    );

    assert_eq!(
        app.get("/api/cart", Some("s1")).await.json(),
        json!([{ "productId": "5", "quantity": 1 }])
    );
    let stats = app.get("/api/admin/stats", None).await.json();
    assert_eq!(stats["totalOrders"], 1);
}

#[tokio::test]
async fn test_code_expires_when_slot_is_taken_without_it() {
    let app = TestApp::new();
    app.place_order("a", "5").await;
    app.place_order("a", "5").await;
    let code = app.generate_code().await.unwrap();

    // Order #3 goes through without the code
    app.place_order("b", "5").await;

    let validation = app
        .post_json("/api/discount/validate", None, &json!({ "code": code }))
        .await
        .json();
    assert_eq!(validation["valid"], false);
    assert!(validation["message"].as_str().unwrap().contains("expired"));

    let stats = app.get("/api/admin/stats", None).await.json();
    assert_eq!(stats["discountCodes"][0]["isUsed"], false);

    // Nothing is issuable again until order #6 is next
    assert!(app.generate_code().await.is_none());
    app.place_order("b", "5").await;
    app.place_order("b", "5").await;
    let next = app.generate_code().await.unwrap();
    assert!(next.starts_with("DISCOUNT_6_"));
}

#[tokio::test]
async fn test_unknown_code_rejects_checkout() {
    let app = TestApp::new();
    app.add_to_cart("s1", "5", 1).await;

    let response = app.checkout("s1", Some("DISCOUNT_3_NOPE00")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Discount code not found");

    // Nothing changed
    assert_eq!(
        app.get("/api/cart", Some("s1")).await.json(),
        json!([{ "productId": "5", "quantity": 1 }])
    );
    let stats = app.get("/api/admin/stats", None).await.json();
    assert_eq!(stats["totalOrders"], 0);
}

#[tokio::test]
async fn test_validate_requires_code() {
    let app = TestApp::new();

    let response = app
        .post_json("/api/discount/validate", None, &json!({}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Discount code is required");

    let response = app
        .post_json("/api/discount/validate", None, &json!({ "code": "" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_validate_unknown_code_is_not_an_error() {
    let app = TestApp::new();

    let response = app
        .post_json("/api/discount/validate", None, &json!({ "code": "BOGUS" }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({ "valid": false, "message": "Discount code not found" })
    );
}

#[tokio::test]
async fn test_custom_threshold_and_rate() {
    let app = TestApp::with_discount(2, "0.25");
    assert!(app.generate_code().await.is_none());

    app.place_order("a", "5").await;
    let code = app.generate_code().await.unwrap();
    assert!(code.starts_with("DISCOUNT_2_"));

    app.add_to_cart("b", "4", 1).await;
    let order = app.checkout("b", Some(&code)).await.json();
    assert_eq!(order["order"]["discount"]["amount"], 30.0);
    assert_eq!(order["order"]["totalAmount"], 90.0);
}

// =============================================================================
// Stats
// =============================================================================

#[tokio::test]
async fn test_stats_on_fresh_store() {
    let app = TestApp::new();

    let response = app.get("/api/admin/stats", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({
            "totalOrders": 0,
            "totalPurchaseAmount": 0.0,
            "discountCodes": [],
            "totalDiscountAmount": 0.0,
        })
    );
}
