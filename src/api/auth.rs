use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::AppError;
use crate::AppState;

/// Seller session middleware.
///
/// Every protected request must carry `Authorization: Bearer <token>`. The
/// token is the seller's Bookify session; it is resolved to a [`Session`]
/// and attached to the request for the handlers. A session the backend
/// rejects (any 401 from a handler) is evicted, so unknown tokens never
/// accumulate in the registry.
///
/// [`Session`]: crate::session::Session
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_string);

    match token {
        Some(token) => {
            let session = state.sessions.open(&token).await;
            req.extensions_mut().insert(session.clone());

            let response = next.run(req).await;
            if response.status() == StatusCode::UNAUTHORIZED {
                state.sessions.evict(&session).await;
            }
            response
        }
        None => AppError::Unauthorized.into_response(),
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
