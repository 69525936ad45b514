use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Balance (GET /stripe/balance)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiMoney {
    pub amount: i64,
    pub currency: String,
}

/// Raw processor balance. The processor reports one entry per currency; the
/// arrays may be empty for accounts that were never charged.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiBalance {
    #[serde(default)]
    pub available: Vec<ApiMoney>,
    #[serde(default)]
    pub pending: Vec<ApiMoney>,
}

// ---------------------------------------------------------------------------
// Collections (GET /stripe/orders/sold/, GET /stripe/payouts/)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
}

// ---------------------------------------------------------------------------
// Onboarding (POST /stripe/connect)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectResponse {
    pub url: String,
}
