mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use common::{qty, TestApp};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

fn movement(product: Uuid, sub_variant: Uuid, quantity: Value) -> Value {
    json!({
        "product_id": product.to_string(),
        "sub_variant_id": sub_variant.to_string(),
        "quantity": quantity,
    })
}

#[tokio::test]
async fn add_stock_returns_the_committed_transaction() {
    let app = TestApp::new().await;
    let (product, sub_variant) = app.seed_stocked("HTTP-ADD", 0).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/stock/add",
            Some(movement(product, sub_variant, json!("4.5"))),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "stock added successfully");
    assert_eq!(body["data"]["transaction_type"], "IN");
    assert_eq!(body["data"]["product_id"], product.to_string());
    assert_eq!(body["data"]["sub_variant_id"], sub_variant.to_string());
    assert_eq!(app.stock_of(sub_variant).await, qty("4.5"));
}

#[tokio::test]
async fn numeric_quantity_is_accepted() {
    let app = TestApp::new().await;
    let (product, sub_variant) = app.seed_stocked("HTTP-NUM", 0).await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/stock/add",
            Some(movement(product, sub_variant, json!(3))),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.total_stock_of(product).await, qty("3"));
}

#[tokio::test]
async fn numeric_quantities_keep_their_exact_digits() {
    let app = TestApp::new().await;
    let (product, sub_variant) = app.seed_stocked("HTTP-EXACT", 0).await;

    for (raw, stored) in [
        ("0.0000001", "0.0000001"),
        ("100000000000.00000001", "100000000000.00000011"),
    ] {
        let body: Value = serde_json::from_str(&format!(
            r#"{{"product_id":"{}","sub_variant_id":"{}","quantity":{}}}"#,
            product, sub_variant, raw
        ))
        .unwrap();
        let (status, response) = app.request(Method::POST, "/api/v1/stock/add", Some(body)).await;
        assert_eq!(status, StatusCode::OK, "quantity {}", raw);
        assert_eq!(response["data"]["quantity"], raw);
        assert_eq!(app.stock_of(sub_variant).await.to_string(), stored);
    }

    let body = movement(product, sub_variant, serde_json::from_str("1e-7").unwrap());
    let (status, response) = app.request(Method::POST, "/api/v1/stock/add", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "invalid_quantity");
}

#[tokio::test]
async fn remove_stock_reports_insufficient_stock() {
    let app = TestApp::new().await;
    let (product, sub_variant) = app.seed_stocked("HTTP-OUT", 2).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/stock/remove",
            Some(movement(product, sub_variant, json!("1"))),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "stock removed successfully");
    assert_eq!(body["data"]["transaction_type"], "OUT");

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/stock/remove",
            Some(movement(product, sub_variant, json!("5"))),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "insufficient_stock");
    assert_eq!(app.stock_of(sub_variant).await, qty("1"));
}

#[tokio::test]
async fn movement_errors_map_to_their_status() {
    let app = TestApp::new().await;
    let (product, sub_variant) = app.seed_stocked("HTTP-ERR", 1).await;

    let cases = [
        (
            json!({"product_id": "nope", "sub_variant_id": sub_variant.to_string(), "quantity": "1"}),
            StatusCode::BAD_REQUEST,
            "invalid_reference",
        ),
        (
            movement(product, sub_variant, json!("0")),
            StatusCode::BAD_REQUEST,
            "invalid_quantity",
        ),
        (
            movement(product, sub_variant, json!("1.123456789")),
            StatusCode::BAD_REQUEST,
            "invalid_quantity",
        ),
        (
            movement(product, Uuid::new_v4(), json!("1")),
            StatusCode::NOT_FOUND,
            "reference_not_found",
        ),
        (
            json!({"product_id": product.to_string()}),
            StatusCode::BAD_REQUEST,
            "bad_request",
        ),
    ];

    for (body, expected_status, expected_code) in cases {
        let (status, response) = app
            .request(Method::POST, "/api/v1/stock/add", Some(body.clone()))
            .await;
        assert_eq!(status, expected_status, "body {}", body);
        assert_eq!(response["code"], expected_code, "body {}", body);
    }
    assert_eq!(app.stock_of(sub_variant).await, qty("1"));
}

#[tokio::test]
async fn report_requires_both_dates() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(Method::GET, "/api/v1/stock/report?from=2025-11-01", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");

    let (status, body) = app
        .request(
            Method::GET,
            "/api/v1/stock/report?from=2025-11-30&to=2025-11-01",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_input");
}

#[tokio::test]
async fn report_returns_totals() {
    let app = TestApp::new().await;
    let (product, sub_variant) = app.seed_stocked("HTTP-REP", 9).await;
    app.request(
        Method::POST,
        "/api/v1/stock/remove",
        Some(movement(product, sub_variant, json!("4"))),
    )
    .await;

    let today = chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string();
    let (status, body) = app
        .request(
            Method::GET,
            &format!("/api/v1/stock/report?from={0}&to={0}&page=abc&limit=5", today),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["transactions"].as_array().map(Vec::len), Some(2));
    assert_eq!(data["page"], 1);
    assert_eq!(data["limit"], 5);
    let total_in: f64 = data["total_in"].as_str().unwrap().parse().unwrap();
    let net: f64 = data["net"].as_str().unwrap().parse().unwrap();
    assert_eq!(total_in, 9.0);
    assert_eq!(net, 5.0);
}

#[tokio::test]
async fn product_endpoints_round_trip() {
    let app = TestApp::new().await;
    let input = serde_json::to_value(common::product_input("HTTP-P", &["HTTP-P-1", "HTTP-P-2"])).unwrap();

    let (status, created) = app
        .request(Method::POST, "/api/v1/products", Some(input.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["data"]["product_code"], "HTTP-P");
    assert_eq!(created["data"]["sub_variants"].as_array().map(Vec::len), Some(2));

    let (status, fetched) = app
        .request(Method::GET, &format!("/api/v1/products/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["id"], id.as_str());
    assert_eq!(fetched["data"]["variants"][0]["options"].as_array().map(Vec::len), Some(2));

    let (status, listed) = app
        .request(Method::GET, "/api/v1/products?page=1&limit=10", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["data"]["total"], 1);
    assert_eq!(listed["data"]["total_pages"], 1);
    assert_eq!(listed["data"]["items"][0]["id"], id.as_str());

    let (status, conflict) = app
        .request(Method::POST, "/api/v1/products", Some(input))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(conflict["code"], "conflict");

    let (status, _) = app
        .request(Method::GET, &format!("/api/v1/products/{}", Uuid::new_v4()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .request(Method::GET, "/api/v1/products/not-an-id", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_reference");
}

#[tokio::test]
async fn request_id_is_echoed_and_reported_in_errors() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/products/not-an-id")
        .header("x-request-id", "req-api-test")
        .body(Body::empty())
        .unwrap();

    let response = app.router().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "req-api-test"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["request_id"], "req-api-test");
}

#[tokio::test]
async fn health_and_openapi_are_served() {
    let app = TestApp::new().await;

    let (status, body) = app.request(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "up");

    let (status, body) = app.request(Method::GET, "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);

    let (status, body) = app.request(Method::GET, "/health/live", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alive"], true);

    let (status, body) = app.request(Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/stock/add"].is_object());
}
