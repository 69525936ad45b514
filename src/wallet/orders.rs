use crate::bookify::BookifyClient;
use crate::errors::WalletError;
use crate::metrics::{record_fetch, record_fetch_failure};
use crate::models::Order;
use crate::session::Session;

const RESOURCE: &str = "sold_orders";

/// Fetch every order where the session is the seller, newest first.
/// Unpaginated: the backend returns the full set in one response.
pub async fn fetch_sold_orders(
    client: &BookifyClient,
    session: &Session,
) -> Result<Vec<Order>, WalletError> {
    record_fetch(RESOURCE);

    match client.get_sold_orders(session).await {
        Ok(mut orders) => {
            sort_newest_first(&mut orders);
            tracing::debug!(
                seller_session = %session.id(),
                count = orders.len(),
                "Sold orders fetched"
            );
            Ok(orders)
        }
        Err(e) => {
            record_fetch_failure(RESOURCE);
            let err = WalletError::from(e);
            tracing::warn!(seller_session = %session.id(), error = %err, "Sold order fetch failed");
            Err(err)
        }
    }
}

/// Stable sort by `created_at` descending.
pub fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
