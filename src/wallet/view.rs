use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::bookify::BookifyClient;
use crate::errors::WalletError;
use crate::models::{Balance, Order, Payout};
use crate::services::notifier::{BalanceUpdate, Notification, WalletEvent};
use crate::session::Session;

use super::payouts::PayoutRequester;
use super::render::{render, WalletScreen};
use super::{balance, orders, payouts};

// ---------------------------------------------------------------------------
// Tabs and state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletTab {
    #[default]
    Orders,
    Payouts,
}

impl WalletTab {
    pub fn from_query(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "orders" => Some(WalletTab::Orders),
            "payouts" => Some(WalletTab::Payouts),
            _ => None,
        }
    }
}

/// Everything the ready view displays. Replaced wholesale on every load so
/// repeated fetches never accumulate rows.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletSnapshot {
    pub balance: Balance,
    pub sold_orders: Vec<Order>,
    pub payouts: Vec<Payout>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Ready(WalletSnapshot),
    Error(WalletError),
}

// ---------------------------------------------------------------------------
// Structured join over the three fetches
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Balance,
    SoldOrders,
    Payouts,
}

/// Result of one fetch task, tagged by resource.
#[derive(Debug)]
pub enum FetchOutcome {
    Balance(Result<Balance, WalletError>),
    SoldOrders(Result<Vec<Order>, WalletError>),
    Payouts(Result<Vec<Payout>, WalletError>),
}

/// Collected successes of a join. Kept per resource so a partial result is
/// representable, even though the view currently renders all-or-nothing.
#[derive(Debug, Default)]
pub struct FetchResults {
    pub balance: Option<Balance>,
    pub sold_orders: Option<Vec<Order>>,
    pub payouts: Option<Vec<Payout>>,
}

impl FetchResults {
    /// Record one outcome; the first failure is returned to the caller.
    pub fn accept(&mut self, outcome: FetchOutcome) -> Result<(), WalletError> {
        match outcome {
            FetchOutcome::Balance(r) => self.balance = Some(r?),
            FetchOutcome::SoldOrders(r) => self.sold_orders = Some(r?),
            FetchOutcome::Payouts(r) => self.payouts = Some(r?),
        }
        Ok(())
    }

    pub fn into_snapshot(self) -> Option<WalletSnapshot> {
        Some(WalletSnapshot {
            balance: self.balance?,
            sold_orders: self.sold_orders?,
            payouts: self.payouts?,
        })
    }
}

// ---------------------------------------------------------------------------
// WalletView
// ---------------------------------------------------------------------------

/// The seller wallet page: balance, sold orders and payout history.
///
/// `loading → ready | error`. Fetches run as tasks owned by the view; they
/// are aborted when the view is dropped or its session ends.
pub struct WalletView {
    client: BookifyClient,
    session: Session,
    requester: Arc<PayoutRequester>,
    state: ViewState,
    tab: WalletTab,
    tasks: JoinSet<FetchOutcome>,
}

impl WalletView {
    pub fn new(client: BookifyClient, session: Session, requester: Arc<PayoutRequester>) -> Self {
        Self {
            client,
            session,
            requester,
            state: ViewState::Loading,
            tab: WalletTab::default(),
            tasks: JoinSet::new(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn tab(&self) -> WalletTab {
        self.tab
    }

    pub fn select_tab(&mut self, tab: WalletTab) {
        self.tab = tab;
    }

    pub fn render(&self) -> WalletScreen {
        render(
            &self.state,
            self.tab,
            self.requester.is_in_flight(self.session.id()),
        )
    }

    /// Fetch balance, sold orders and payouts concurrently. Ready only when
    /// all three succeed; otherwise the first failure becomes the page error.
    pub async fn load(&mut self) -> &ViewState {
        self.state = ViewState::Loading;
        let started = Instant::now();

        let result = self
            .run_fetches(&[FetchKind::Balance, FetchKind::SoldOrders, FetchKind::Payouts])
            .await
            .and_then(|results| {
                results
                    .into_snapshot()
                    .ok_or_else(|| WalletError::upstream("incomplete wallet data"))
            });

        histogram!("wallet_load_seconds").record(started.elapsed().as_secs_f64());

        self.state = match result {
            Ok(snapshot) => {
                counter!("wallet_loads_total", "outcome" => "ready").increment(1);
                tracing::info!(
                    seller_session = %self.session.id(),
                    orders = snapshot.sold_orders.len(),
                    payouts = snapshot.payouts.len(),
                    "Wallet loaded"
                );
                ViewState::Ready(snapshot)
            }
            Err(e) => {
                counter!("wallet_loads_total", "outcome" => "error").increment(1);
                tracing::warn!(seller_session = %self.session.id(), error = %e, "Wallet load failed");
                ViewState::Error(e)
            }
        };
        &self.state
    }

    /// Re-fetch balance and payout history after a payout. Sold orders are
    /// untouched. A view that is not ready gets a full load instead.
    pub async fn refresh(&mut self) -> Result<(), WalletError> {
        if !matches!(self.state, ViewState::Ready(_)) {
            return match self.load().await {
                ViewState::Error(e) => Err(e.clone()),
                _ => Ok(()),
            };
        }

        let results = match self
            .run_fetches(&[FetchKind::Balance, FetchKind::Payouts])
            .await
        {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(seller_session = %self.session.id(), error = %e, "Wallet refresh failed");
                self.state = ViewState::Error(e.clone());
                return Err(e);
            }
        };

        if let ViewState::Ready(snapshot) = &mut self.state {
            if let Some(balance) = results.balance {
                snapshot.balance = balance;
            }
            if let Some(payouts) = results.payouts {
                snapshot.payouts = payouts;
            }

            self.requester
                .notifier()
                .publish(WalletEvent::BalanceUpdate(BalanceUpdate {
                    session_id: self.session.id(),
                    available: snapshot.balance.available.to_string(),
                    pending: snapshot.balance.pending.to_string(),
                    payout_enabled: snapshot.balance.can_request_payout(),
                }));
        }
        Ok(())
    }

    /// Request a payout of the available balance, then refresh on success.
    pub async fn request_payout(&mut self) -> Result<Notification, WalletError> {
        let available = match &self.state {
            ViewState::Ready(snapshot) => snapshot.balance.available.clone(),
            _ => {
                return Err(WalletError::PreconditionFailed(
                    "wallet is not loaded".into(),
                ))
            }
        };

        let requester = Arc::clone(&self.requester);
        let session = self.session.clone();

        requester
            .request(&session, &available, move || async move {
                // Failure is already reflected in the view state.
                let _ = self.refresh().await;
            })
            .await
    }

    /// Abort any fetch still running. Dropping the view does the same.
    pub async fn teardown(&mut self) {
        self.tasks.shutdown().await;
    }

    async fn run_fetches(&mut self, kinds: &[FetchKind]) -> Result<FetchResults, WalletError> {
        // Anything left from an earlier, abandoned load is stale.
        self.tasks.shutdown().await;

        if !self.session.is_active() {
            return Err(WalletError::Unauthenticated);
        }

        for kind in kinds {
            self.spawn_fetch(*kind);
        }

        let session = self.session.clone();
        let result = tokio::select! {
            joined = join_all(&mut self.tasks) => joined,
            _ = session.ended() => Err(WalletError::Unauthenticated),
        };

        if result.is_err() {
            self.tasks.shutdown().await;
        }
        result
    }

    fn spawn_fetch(&mut self, kind: FetchKind) {
        let client = self.client.clone();
        let session = self.session.clone();

        match kind {
            FetchKind::Balance => self.tasks.spawn(async move {
                FetchOutcome::Balance(balance::fetch_balance(&client, &session).await)
            }),
            FetchKind::SoldOrders => self.tasks.spawn(async move {
                FetchOutcome::SoldOrders(orders::fetch_sold_orders(&client, &session).await)
            }),
            FetchKind::Payouts => self.tasks.spawn(async move {
                FetchOutcome::Payouts(payouts::fetch_payouts(&client, &session).await)
            }),
        };
    }
}

impl Drop for WalletView {
    fn drop(&mut self) {
        if !self.tasks.is_empty() {
            tracing::debug!(
                seller_session = %self.session.id(),
                pending = self.tasks.len(),
                "Wallet view dropped, aborting in-flight fetches"
            );
            self.tasks.abort_all();
        }
    }
}

/// Join every task, failing fast on the first error in completion order.
async fn join_all(tasks: &mut JoinSet<FetchOutcome>) -> Result<FetchResults, WalletError> {
    let mut results = FetchResults::default();
    while let Some(joined) = tasks.join_next().await {
        let outcome =
            joined.map_err(|e| WalletError::upstream(format!("fetch task did not finish: {e}")))?;
        results.accept(outcome)?;
    }
    Ok(results)
}
