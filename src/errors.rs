use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::bookify::BookifyClientError;

/// Failures of the wallet flow. None of them is fatal to the process; each is
/// local to one view and recoverable by reloading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("a payout request is already in flight")]
    PayoutInFlight,

    #[error("unauthenticated")]
    Unauthenticated,
}

impl WalletError {
    pub fn upstream(msg: impl Into<String>) -> Self {
        WalletError::UpstreamUnavailable(msg.into())
    }
}

impl From<BookifyClientError> for WalletError {
    fn from(e: BookifyClientError) -> Self {
        match e {
            BookifyClientError::Unauthorized => WalletError::Unauthenticated,
            other => WalletError::UpstreamUnavailable(other.to_string()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".into()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}

impl From<WalletError> for AppError {
    fn from(e: WalletError) -> Self {
        match e {
            WalletError::Unauthenticated => AppError::Unauthorized,
            WalletError::PreconditionFailed(msg) => AppError::BadRequest(msg),
            WalletError::PayoutInFlight => {
                AppError::Conflict("a payout request is already in flight".into())
            }
            WalletError::UpstreamUnavailable(msg) => {
                tracing::warn!(error = %msg, "Upstream failure surfaced to client");
                AppError::Upstream("Bookify backend unavailable".into())
            }
        }
    }
}
