use super::*;

fn client(base_url: &str) -> BackendClient {
    BackendClient::new(base_url, Duration::from_secs(5), "iluma-test/0.1", 50, 0, 0).unwrap()
}

#[test]
fn category_url_includes_skip_and_limit() {
    let c = client("http://backend.test");
    assert_eq!(
        c.category_url(Category::Terea, 100, 50),
        "http://backend.test/products/terea?skip=100&limit=50"
    );
}

#[test]
fn base_url_trailing_slash_is_trimmed() {
    let c = client("http://backend.test/api/");
    assert_eq!(c.base_url(), "http://backend.test/api");
    assert_eq!(c.orders_url(), "http://backend.test/api/orders");
}

#[test]
fn rejects_relative_base_url() {
    let err =
        BackendClient::new("backend.test", Duration::from_secs(5), "ua", 50, 0, 0).unwrap_err();
    assert!(
        matches!(err, BackendError::InvalidBaseUrl { .. }),
        "expected InvalidBaseUrl, got: {err:?}"
    );
}

#[test]
fn rejects_non_http_scheme() {
    let err = BackendClient::new("ftp://backend.test", Duration::from_secs(5), "ua", 50, 0, 0)
        .unwrap_err();
    assert!(
        matches!(err, BackendError::InvalidBaseUrl { ref reason, .. } if reason.contains("ftp"))
    );
}

#[test]
fn zero_page_size_is_clamped() {
    let c =
        BackendClient::new("http://backend.test", Duration::from_secs(5), "ua", 0, 0, 0).unwrap();
    assert_eq!(c.page_size(), 1);
}
