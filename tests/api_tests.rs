mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bookify_wallet::api::router::create_router;
use bookify_wallet::AppState;

use common::*;

fn build_test_app(server: &MockServer) -> (axum::Router, AppState) {
    let state = test_state(server);
    (create_router(state.clone()), state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {SELLER_TOKEN}"))
        .body(Body::empty())
        .unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {SELLER_TOKEN}"))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;
    let (app, _state) = build_test_app(&server);

    let resp = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("active_sessions").is_none());
}

#[tokio::test]
async fn test_wallet_requires_session() {
    let server = MockServer::start().await;
    let (app, _state) = build_test_app(&server);

    let resp = app
        .oneshot(Request::builder().uri("/api/wallet").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(resp).await;
    assert_eq!(json["success"], false);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_get_wallet_ready() {
    let server = MockServer::start().await;
    mount_healthy_wallet(&server).await;
    let (app, _state) = build_test_app(&server);

    let resp = app.oneshot(get("/api/wallet")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["state"], "ready");
    assert_eq!(json["tab"], "orders");
    assert_eq!(json["balance"]["available"], "USD 19.99");
    assert_eq!(json["payout_action"]["enabled"], true);
    assert_eq!(json["sold_orders"].as_array().unwrap().len(), 2);
    assert!(json["error"].is_null());
}

#[tokio::test]
async fn test_get_wallet_payouts_tab_empty() {
    let server = MockServer::start().await;
    mount_json(&server, BALANCE_PATH, balance_body(0, 0)).await;
    mount_json(&server, SOLD_ORDERS_PATH, sold_orders_body()).await;
    mount_json(&server, PAYOUTS_PATH, json!({ "data": [] })).await;
    let (app, _state) = build_test_app(&server);

    let resp = app.oneshot(get("/api/wallet?tab=payouts")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["tab"], "payouts");
    assert_eq!(json["empty_message"], "You haven't made any payout requests yet.");
    assert!(json["payouts"].is_null());
    assert!(json["payout_action"].is_null());
}

#[tokio::test]
async fn test_get_wallet_unknown_tab() {
    let server = MockServer::start().await;
    let (app, _state) = build_test_app(&server);

    let resp = app.oneshot(get("/api/wallet?tab=analytics")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_wallet_upstream_failure() {
    let server = MockServer::start().await;
    mount_status(&server, "GET", PAYOUTS_PATH, 503).await;
    mount_healthy_wallet(&server).await;
    let (app, _state) = build_test_app(&server);

    let resp = app.oneshot(get("/api/wallet")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(resp).await;
    assert_eq!(json["state"], "error");
    assert_eq!(json["error"], "Failed to load wallet data. Please try again.");
    assert!(json["balance"].is_null());
}

#[tokio::test]
async fn test_get_wallet_backend_rejects_session() {
    let server = MockServer::start().await;
    mount_status(&server, "GET", BALANCE_PATH, 401).await;
    mount_healthy_wallet(&server).await;
    let (app, state) = build_test_app(&server);

    let resp = app.oneshot(get("/api/wallet")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(state.sessions.active_count().await, 0);
}

#[tokio::test]
async fn test_rejected_tokens_do_not_accumulate_sessions() {
    let server = MockServer::start().await;
    for route in [BALANCE_PATH, SOLD_ORDERS_PATH, PAYOUTS_PATH] {
        mount_status(&server, "GET", route, 401).await;
    }
    mount_status(&server, "POST", CONNECT_PATH, 401).await;
    let (app, state) = build_test_app(&server);

    for i in 0..50 {
        let uri = if i % 2 == 0 { "/api/wallet" } else { "/api/wallet/connect" };
        let req = Request::builder()
            .method(if i % 2 == 0 { "GET" } else { "POST" })
            .uri(uri)
            .header("authorization", format!("Bearer junk-{i}"))
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    assert_eq!(state.sessions.active_count().await, 0);
}

#[tokio::test]
async fn test_request_payout() {
    let server = MockServer::start().await;
    mount_healthy_wallet(&server).await;
    mount_create_payout(&server, 200, Duration::ZERO).await;
    let (app, _state) = build_test_app(&server);

    let resp = app.oneshot(post("/api/wallet/payouts")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["level"], "success");
    assert_eq!(
        json["data"]["message"],
        "Payout of USD 19.99 requested successfully."
    );
    assert_eq!(request_count(&server, CREATE_PAYOUT_PATH).await, 1);
}

#[tokio::test]
async fn test_request_payout_with_zero_balance() {
    let server = MockServer::start().await;
    mount_json(&server, BALANCE_PATH, balance_body(0, 1500)).await;
    mount_json(&server, SOLD_ORDERS_PATH, sold_orders_body()).await;
    mount_json(&server, PAYOUTS_PATH, payouts_body()).await;
    mount_create_payout(&server, 200, Duration::ZERO).await;
    let (app, _state) = build_test_app(&server);

    let resp = app.oneshot(post("/api/wallet/payouts")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(request_count(&server, CREATE_PAYOUT_PATH).await, 0);
}

#[tokio::test]
async fn test_request_payout_upstream_failure() {
    let server = MockServer::start().await;
    mount_healthy_wallet(&server).await;
    mount_create_payout(&server, 500, Duration::ZERO).await;
    let (app, _state) = build_test_app(&server);

    let resp = app.oneshot(post("/api/wallet/payouts")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "Failed to request payout. Please try again.");
}

#[tokio::test]
async fn test_connect_returns_onboarding_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CONNECT_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "url": "https://connect.stripe.com/setup/s/abc" })),
        )
        .mount(&server)
        .await;
    let (app, _state) = build_test_app(&server);

    let resp = app.oneshot(post("/api/wallet/connect")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["data"]["url"], "https://connect.stripe.com/setup/s/abc");
}

#[tokio::test]
async fn test_logout_closes_session() {
    let server = MockServer::start().await;
    let (app, state) = build_test_app(&server);

    let session = state.sessions.open(SELLER_TOKEN).await;
    assert!(session.is_active());

    let resp = app.oneshot(post("/api/session/logout")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!session.is_active());
    assert_eq!(state.sessions.active_count().await, 0);
}

#[tokio::test]
async fn test_metrics_endpoint_reports_wallet_metrics() {
    let server = MockServer::start().await;
    mount_healthy_wallet(&server).await;

    // Current-thread test runtime: the fetch tasks record on this recorder too.
    let recorder = PrometheusBuilder::new().build_recorder();
    let _local = metrics::set_default_local_recorder(&recorder);
    bookify_wallet::metrics::register_metrics();
    let state = test_state_with_metrics(&server, recorder.handle());

    let resp = create_router(state.clone())
        .oneshot(get("/api/wallet"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = create_router(state)
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    for name in [
        "wallet_fetch_total",
        "wallet_fetch_failures_total",
        "wallet_loads_total",
        "payout_requests_total",
        "payout_failures_total",
        "wallet_load_seconds",
        "wallet_active_sessions",
    ] {
        assert!(text.contains(name), "missing {name} in:\n{text}");
    }
    assert!(text.contains(r#"wallet_loads_total{outcome="ready"} 1"#), "{text}");
    assert!(text.contains(r#"wallet_loads_total{outcome="error"} 0"#), "{text}");
    assert!(text.contains(r#"wallet_fetch_total{resource="balance"} 1"#), "{text}");
    assert!(text.contains("payout_requests_total 0"), "{text}");
}
