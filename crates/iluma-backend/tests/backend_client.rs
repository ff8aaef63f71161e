//! Integration tests for `BackendClient` against a `wiremock` backend.
//!
//! Covers skip/limit paging, every error variant `fetch_category` can
//! propagate, retry behaviour, and order submission.

use std::str::FromStr;
use std::time::Duration;

use iluma_backend::{BackendClient, BackendError};
use iluma_core::{Category, OrderRequest, OrderedItem};
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 5-second timeout, page size 2, no retries.
fn test_client(server: &MockServer) -> BackendClient {
    BackendClient::new(&server.uri(), Duration::from_secs(5), "iluma-test/0.1", 2, 0, 0)
        .expect("failed to build test BackendClient")
}

fn test_client_with_retries(server: &MockServer, max_retries: u32) -> BackendClient {
    BackendClient::new(
        &server.uri(),
        Duration::from_secs(5),
        "iluma-test/0.1",
        2,
        max_retries,
        0,
    )
    .expect("failed to build test BackendClient")
}

fn products(category: &str, ids: &[i64]) -> serde_json::Value {
    let list: Vec<_> = ids
        .iter()
        .map(|id| {
            json!({"id": id, "name": format!("Product {id}"), "type": category, "nalichie": 1})
        })
        .collect();
    let mut root = serde_json::Map::new();
    root.insert(category.to_string(), serde_json::Value::Array(list));
    serde_json::Value::Object(root)
}

// ---------------------------------------------------------------------------
// paging
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_category_returns_empty_vec_for_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/terea"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products("terea", &[])))
        .mount(&server)
        .await;

    let result = test_client(&server).fetch_category(Category::Terea).await;
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    assert!(result.unwrap().is_empty());
}

#[tokio::test]
async fn fetch_category_walks_skip_until_short_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/iqos"))
        .and(query_param("skip", "0"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products("iqos", &[1, 2])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/iqos"))
        .and(query_param("skip", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products("iqos", &[3, 4])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/iqos"))
        .and(query_param("skip", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products("iqos", &[5])))
        .expect(1)
        .mount(&server)
        .await;

    let fetched = test_client(&server)
        .fetch_category(Category::Iqos)
        .await
        .expect("three pages");
    let names: Vec<_> = fetched.iter().filter_map(|p| p.name.as_deref()).collect();
    assert_eq!(
        names,
        vec!["Product 1", "Product 2", "Product 3", "Product 4", "Product 5"]
    );
}

#[tokio::test]
async fn fetch_category_is_all_or_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/terea"))
        .and(query_param("skip", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products("terea", &[1, 2])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/terea"))
        .and(query_param("skip", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .fetch_category(Category::Terea)
        .await
        .unwrap_err();
    assert!(
        matches!(err, BackendError::UnexpectedStatus { status: 500, .. }),
        "expected UnexpectedStatus(500), got: {err:?}"
    );
}

#[tokio::test]
async fn fetch_category_stops_at_pagination_limit() {
    let server = MockServer::start().await;
    // A backend that ignores `skip` returns a full page forever.
    Mock::given(method("GET"))
        .and(path("/products/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products("devices", &[1, 2])))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .fetch_category(Category::Devices)
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::PaginationLimit { .. }));
}

// ---------------------------------------------------------------------------
// error statuses
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rate_limit_reports_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/terea"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .mount(&server)
        .await;

    match test_client(&server).fetch_category(Category::Terea).await {
        Err(BackendError::RateLimited { retry_after_secs }) => assert_eq!(retry_after_secs, 30),
        other => panic!("expected RateLimited, got: {other:?}"),
    }
}

#[tokio::test]
async fn not_found_is_typed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/terea"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .fetch_category(Category::Terea)
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::NotFound { .. }));
}

#[tokio::test]
async fn html_body_is_a_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/terea"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .fetch_category(Category::Terea)
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Deserialize { .. }));
}

#[tokio::test]
async fn server_error_is_retried_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/terea"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/terea"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products("terea", &[7])))
        .mount(&server)
        .await;

    let fetched = test_client_with_retries(&server, 1)
        .fetch_category(Category::Terea)
        .await
        .expect("retry should recover");
    assert_eq!(fetched.len(), 1);
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/terea"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(products("terea", &[]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = BackendClient::new(
        &server.uri(),
        Duration::from_millis(100),
        "iluma-test/0.1",
        2,
        0,
        0,
    )
    .unwrap();
    let err = client.fetch_category(Category::Terea).await.unwrap_err();
    assert!(matches!(err, BackendError::Http(ref e) if e.is_timeout()));
}

// ---------------------------------------------------------------------------
// orders
// ---------------------------------------------------------------------------

fn order() -> OrderRequest {
    OrderRequest {
        customer_name: "Анна".to_string(),
        phone_number: "79123456789".to_string(),
        is_delivery: false,
        city: String::new(),
        address: String::new(),
        ordered_items: vec![OrderedItem {
            product_name: "Terea Amber (блок)".to_string(),
            quantity: 2,
            price_at_time_of_order: Decimal::from_str("5500").unwrap(),
        }],
    }
}

#[tokio::test]
async fn submit_order_posts_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(body_json(json!({
            "customer_name": "Анна",
            "phone_number": "79123456789",
            "is_delivery": false,
            "city": "",
            "address": "",
            "ordered_items": [
                {
                    "product_name": "Terea Amber (блок)",
                    "quantity": 2,
                    "price_at_time_of_order": 5500.0
                }
            ]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 17})))
        .expect(1)
        .mount(&server)
        .await;

    test_client(&server)
        .submit_order(&order())
        .await
        .expect("2xx is success");
}

#[tokio::test]
async fn submit_order_is_not_retried_on_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client_with_retries(&server, 3)
        .submit_order(&order())
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::UnexpectedStatus { status: 503, .. }));
}
