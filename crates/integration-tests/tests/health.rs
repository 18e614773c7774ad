//! Probes and the request-id layer.

#![allow(clippy::unwrap_used)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use storekeep_api::middleware::REQUEST_ID_HEADER;
use storekeep_integration_tests::TestApp;

#[tokio::test]
async fn test_liveness_and_readiness() {
    let app = TestApp::new();

    let live = app.get("/health", None).await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.body, "ok");

    let ready = app.get("/health/ready", None).await;
    assert_eq!(ready.status, StatusCode::OK);
}

#[tokio::test]
async fn test_every_response_carries_a_request_id() {
    let app = TestApp::new();

    for resp in [
        app.get("/health", None).await,
        app.get("/v1/products/0", None).await,
        app.get("/v1/users/addresses", None).await,
    ] {
        let id = resp.headers.get(REQUEST_ID_HEADER).unwrap();
        assert!(!id.is_empty());
    }
}

#[tokio::test]
async fn test_supplied_request_id_is_echoed() {
    let app = TestApp::new();

    let request = Request::get("/v1/products")
        .header(REQUEST_ID_HEADER, "trace-me-123")
        .body(Body::empty())
        .unwrap();
    let resp = app.send(request).await;

    assert_eq!(resp.headers.get(REQUEST_ID_HEADER).unwrap(), "trace-me-123");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new();

    let resp = app.get("/v1/nowhere", None).await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}
