use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use metrics::counter;
use uuid::Uuid;

use crate::bookify::BookifyClient;
use crate::errors::WalletError;
use crate::metrics::{record_fetch, record_fetch_failure};
use crate::models::{Money, Payout};
use crate::services::notifier::{format_payout_success, Notification, Notifier, PAYOUT_FAILED_MESSAGE};
use crate::session::Session;

const RESOURCE: &str = "payouts";

/// Fetch the seller's payout history, newest first.
pub async fn fetch_payouts(
    client: &BookifyClient,
    session: &Session,
) -> Result<Vec<Payout>, WalletError> {
    record_fetch(RESOURCE);

    match client.get_payouts(session).await {
        Ok(mut payouts) => {
            payouts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            tracing::debug!(
                seller_session = %session.id(),
                count = payouts.len(),
                "Payouts fetched"
            );
            Ok(payouts)
        }
        Err(e) => {
            record_fetch_failure(RESOURCE);
            let err = WalletError::from(e);
            tracing::warn!(seller_session = %session.id(), error = %err, "Payout fetch failed");
            Err(err)
        }
    }
}

/// Submits payout requests on behalf of sellers.
///
/// At most one request per session is in flight; a second attempt while the
/// first is running is refused, which is what the disabled control shows.
/// Money movement is atomic on the processor side, so a failed request leaves
/// nothing to undo here.
pub struct PayoutRequester {
    client: BookifyClient,
    notifier: Notifier,
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
}

/// Marks a session's payout as in flight until dropped.
struct InFlightGuard {
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
    session_id: Uuid,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.session_id);
    }
}

impl PayoutRequester {
    pub fn new(client: BookifyClient, notifier: Notifier) -> Self {
        Self {
            client,
            notifier,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn is_in_flight(&self, session_id: Uuid) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&session_id)
    }

    fn begin(&self, session_id: Uuid) -> Result<InFlightGuard, WalletError> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(session_id) {
            return Err(WalletError::PayoutInFlight);
        }
        Ok(InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
            session_id,
        })
    }

    /// Request a payout of the whole available balance.
    ///
    /// Sequence: mark in flight, call the processor, notify, then run
    /// `refresh` once on success. Precondition and in-flight refusals are
    /// returned without a notification; upstream failures are notified and
    /// skip the refresh.
    pub async fn request<F, Fut>(
        &self,
        session: &Session,
        available: &Money,
        refresh: F,
    ) -> Result<Notification, WalletError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        if !available.is_positive() {
            return Err(WalletError::PreconditionFailed(format!(
                "no available balance to pay out ({available})"
            )));
        }

        let _guard = self.begin(session.id())?;
        counter!("payout_requests_total").increment(1);
        tracing::info!(
            seller_session = %session.id(),
            amount = available.amount,
            currency = %available.currency,
            "Requesting payout"
        );

        if let Err(e) = self.client.create_payout(session).await {
            counter!("payout_failures_total").increment(1);
            let err = WalletError::from(e);
            tracing::warn!(seller_session = %session.id(), error = %err, "Payout request failed");
            self.notifier
                .notify(Notification::error(session.id(), PAYOUT_FAILED_MESSAGE));
            return Err(err);
        }

        let notification = Notification::success(session.id(), format_payout_success(available));
        self.notifier.notify(notification.clone());

        refresh().await;
        Ok(notification)
    }
}
