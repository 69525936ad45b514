use std::time::Duration;

use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bookify_wallet::config::AppConfig;
use bookify_wallet::session::Session;
use bookify_wallet::AppState;

pub const API_KEY: &str = "test-api-key";
pub const SELLER_TOKEN: &str = "tok_seller_1";

pub const BALANCE_PATH: &str = "/stripe/balance";
pub const SOLD_ORDERS_PATH: &str = "/stripe/orders/sold/";
pub const PAYOUTS_PATH: &str = "/stripe/payouts/";
pub const CREATE_PAYOUT_PATH: &str = "/stripe/payouts/create";
pub const CONNECT_PATH: &str = "/stripe/connect";

/// App state wired to a mocked Bookify backend.
#[allow(dead_code)]
pub fn test_state(server: &MockServer) -> AppState {
    test_state_with_metrics(server, bookify_wallet::metrics::detached_handle())
}

#[allow(dead_code)]
pub fn test_state_with_metrics(server: &MockServer, handle: PrometheusHandle) -> AppState {
    let config = AppConfig::for_backend(server.uri(), API_KEY);
    AppState::new(config, handle)
}

#[allow(dead_code)]
pub fn seller_session() -> Session {
    Session::new(SELLER_TOKEN)
}

#[allow(dead_code)]
pub fn balance_body(available: i64, pending: i64) -> Value {
    json!({
        "available": [{ "amount": available, "currency": "usd" }],
        "pending": [{ "amount": pending, "currency": "usd" }]
    })
}

#[allow(dead_code)]
pub fn sold_orders_body() -> Value {
    json!({
        "data": [
            {
                "id": "ord_old",
                "sellerId": "seller_1",
                "buyerId": "buyer_1",
                "productId": "book-1",
                "product": { "id": "book-1", "title": "Book 1" },
                "amount": 1000,
                "status": "COMPLETED",
                "createdAt": "2023-05-01T10:00:00.000Z",
                "updatedAt": "2023-05-01T10:00:00.000Z"
            },
            {
                "id": "ord_new",
                "sellerId": "seller_1",
                "buyerId": "buyer_2",
                "productId": "book-2",
                "product": { "id": "book-2", "title": "Book 2" },
                "amount": 999,
                "status": "COMPLETED",
                "createdAt": "2023-05-03T10:00:00.000Z",
                "updatedAt": "2023-05-03T10:00:00.000Z"
            }
        ]
    })
}

#[allow(dead_code)]
pub fn payouts_body() -> Value {
    json!({
        "data": [
            {
                "id": "payout-1",
                "amount": 5000,
                "status": "paid",
                "createdAt": "2023-05-02",
                "arrivalDate": "2023-05-05"
            }
        ]
    })
}

fn authenticated_get(route: &str) -> wiremock::MockBuilder {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("x-api-key", API_KEY))
        .and(header("authorization", format!("Bearer {SELLER_TOKEN}").as_str()))
}

#[allow(dead_code)]
pub async fn mount_json(server: &MockServer, route: &str, body: Value) {
    authenticated_get(route)
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Serve `body` for the first `times` matching requests only.
#[allow(dead_code)]
pub async fn mount_json_times(server: &MockServer, route: &str, body: Value, times: u64) {
    authenticated_get(route)
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .up_to_n_times(times)
        .mount(server)
        .await;
}

#[allow(dead_code)]
pub async fn mount_delayed_json(server: &MockServer, route: &str, body: Value, delay: Duration) {
    authenticated_get(route)
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(body)
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

#[allow(dead_code)]
pub async fn mount_status(server: &MockServer, http_method: &str, route: &str, status: u16) {
    Mock::given(method(http_method))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

#[allow(dead_code)]
pub async fn mount_create_payout(server: &MockServer, status: u16, delay: Duration) {
    Mock::given(method("POST"))
        .and(path(CREATE_PAYOUT_PATH))
        .and(header("x-api-key", API_KEY))
        .and(header("authorization", format!("Bearer {SELLER_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(status).set_delay(delay))
        .mount(server)
        .await;
}

/// Healthy backend: USD 19.99 available, two sold orders, one payout.
#[allow(dead_code)]
pub async fn mount_healthy_wallet(server: &MockServer) {
    mount_json(server, BALANCE_PATH, balance_body(1999, 500)).await;
    mount_json(server, SOLD_ORDERS_PATH, sold_orders_body()).await;
    mount_json(server, PAYOUTS_PATH, payouts_body()).await;
}

/// Number of requests the backend received for `route`.
#[allow(dead_code)]
pub async fn request_count(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == route)
        .count()
}
