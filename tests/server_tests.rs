//! HTTP front end driven through the axum router.

mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use common::{config_for, ok_with_cookie, start_origin};
use hotspot_relay::http::X_REQUEST_ID;
use hotspot_relay::{HttpServer, RelayContext};
use tokio::net::TcpListener;
use tower::ServiceExt;

fn server(config: hotspot_relay::RelayConfig) -> HttpServer {
    let context = Arc::new(RelayContext::new(&config));
    HttpServer::with_context(config, context)
}

#[tokio::test]
async fn test_layer_response_headers() {
    let origin = start_origin(|_| ok_with_cookie(r#"{"layer":"L"}"#, "sid=9")).await;
    let app = server(config_for(origin.port(), &[])).router();

    let response = app
        .oneshot(
            Request::get("/php/arpoise.php?layerName=L&lat=1&lon=2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(response.headers()[header::SET_COOKIE], "sid=9");
    assert!(response.headers().contains_key(X_REQUEST_ID));

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], br#"{"layer":"L"}"#);
}

#[tokio::test]
async fn test_root_path_and_supplied_request_id() {
    let origin = start_origin(|_| ok_with_cookie("{}", "sid=1")).await;
    let app = server(config_for(origin.port(), &[])).router();

    let response = app
        .oneshot(
            Request::get("/?layerName=L")
                .header(X_REQUEST_ID, "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[X_REQUEST_ID], "req-42");
}

#[tokio::test]
async fn test_unreachable_origin_is_bad_gateway() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let app = server(config_for(port, &[])).router();
    let response = app
        .oneshot(Request::get("/?layerName=L").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_bad_port_is_internal_error() {
    let app = server(config_for(1, &[("Port", "0")])).router();
    let response = app
        .oneshot(Request::get("/?layerName=L").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&body).contains("bad port"));
}

#[tokio::test]
async fn test_post_is_rejected() {
    let app = server(config_for(1, &[])).router();
    let response = app
        .oneshot(
            Request::post("/?layerName=L")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_graceful_shutdown() {
    let shutdown = hotspot_relay::Shutdown::new();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let handle = tokio::spawn(server(config_for(1, &[])).run(listener, shutdown.subscribe()));

    shutdown.trigger();
    let result = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}
