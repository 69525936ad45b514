use axum::extract::State;
use axum::{Extension, Json};
use serde_json::json;

use crate::session::Session;
use crate::AppState;

/// POST /api/session/logout — end the seller session and cancel its work.
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Json<serde_json::Value> {
    let closed = state.sessions.close(session.token()).await;
    tracing::info!(seller_session = %session.id(), closed, "Seller logged out");
    Json(json!({ "status": "logged_out" }))
}
