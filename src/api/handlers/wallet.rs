use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, WalletError};
use crate::services::notifier::{Notification, PAYOUT_FAILED_MESSAGE};
use crate::session::Session;
use crate::wallet::{ViewState, WalletScreen, WalletTab};
use crate::AppState;

use super::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct WalletQuery {
    pub tab: Option<String>,
}

/// GET /api/wallet?tab=orders|payouts — the rendered wallet page.
///
/// 200 when ready, 502 with the page-level error when any fetch failed.
pub async fn show(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<WalletQuery>,
) -> Result<(StatusCode, Json<WalletScreen>), AppError> {
    let tab = match query.tab.as_deref() {
        None => WalletTab::default(),
        Some(raw) => WalletTab::from_query(raw)
            .ok_or_else(|| AppError::BadRequest(format!("unknown tab {raw:?}")))?,
    };

    let mut view = state.wallet_view(session);
    view.select_tab(tab);

    let status = match view.load().await {
        ViewState::Ready(_) => StatusCode::OK,
        ViewState::Error(WalletError::Unauthenticated) => return Err(AppError::Unauthorized),
        _ => StatusCode::BAD_GATEWAY,
    };

    Ok((status, Json(view.render())))
}

/// POST /api/wallet/payouts — pay out the available balance.
pub async fn request_payout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ApiResponse<Notification>>, AppError> {
    let mut view = state.wallet_view(session);

    if let ViewState::Error(e) = view.load().await {
        return Err(e.clone().into());
    }

    let notification = view.request_payout().await.map_err(|e| match e {
        WalletError::UpstreamUnavailable(_) => AppError::Upstream(PAYOUT_FAILED_MESSAGE.into()),
        other => other.into(),
    })?;

    Ok(Json(ApiResponse::ok(notification)))
}

#[derive(Debug, Serialize)]
pub struct ConnectLink {
    pub url: String,
}

/// POST /api/wallet/connect — processor onboarding link for the seller.
pub async fn connect(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ApiResponse<ConnectLink>>, AppError> {
    let url = state
        .bookify
        .connect_account(&session)
        .await
        .map_err(WalletError::from)?;

    tracing::info!(seller_session = %session.id(), "Issued onboarding link");
    Ok(Json(ApiResponse::ok(ConnectLink { url })))
}
