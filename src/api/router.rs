use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;
use super::auth::require_session;
use super::handlers;

pub fn create_router(state: AppState) -> Router {
    // Public routes — no session required
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render));

    // Seller routes — require a Bearer session token
    let protected = Router::new()
        // Wallet
        .route("/api/wallet", get(handlers::wallet::show))
        .route("/api/wallet/payouts", post(handlers::wallet::request_payout))
        .route("/api/wallet/connect", post(handlers::wallet::connect))
        // Session
        .route("/api/session/logout", post(handlers::session::logout))
        // WebSocket
        .route("/ws", get(handlers::ws::handler))
        .layer(middleware::from_fn_with_state(state.clone(), require_session));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
