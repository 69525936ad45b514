use crate::bookify::{ApiBalance, ApiMoney, BookifyClient};
use crate::errors::WalletError;
use crate::metrics::{record_fetch, record_fetch_failure};
use crate::models::{Balance, Money};
use crate::session::Session;

const RESOURCE: &str = "balance";

/// Fetch the seller's processor balance and reduce it to one available and
/// one pending figure.
pub async fn fetch_balance(
    client: &BookifyClient,
    session: &Session,
) -> Result<Balance, WalletError> {
    record_fetch(RESOURCE);

    let result = match client.get_balance(session).await {
        Ok(raw) => reduce_balance(&raw),
        Err(e) => Err(WalletError::from(e)),
    };

    match &result {
        Ok(balance) => tracing::debug!(
            seller_session = %session.id(),
            available = %balance.available,
            pending = %balance.pending,
            "Balance fetched"
        ),
        Err(e) => {
            record_fetch_failure(RESOURCE);
            tracing::warn!(seller_session = %session.id(), error = %e, "Balance fetch failed");
        }
    }
    result
}

/// Take the first entry of each array. Empty arrays and out-of-range figures
/// are upstream faults, never index panics.
pub fn reduce_balance(raw: &ApiBalance) -> Result<Balance, WalletError> {
    Ok(Balance {
        available: first_entry("available", &raw.available)?,
        pending: first_entry("pending", &raw.pending)?,
    })
}

fn first_entry(field: &str, entries: &[ApiMoney]) -> Result<Money, WalletError> {
    let entry = entries
        .first()
        .ok_or_else(|| WalletError::upstream(format!("balance has no {field} entry")))?;

    Money::new(entry.amount, &entry.currency)
        .map_err(|e| WalletError::upstream(format!("balance {field}: {e}")))
}
