use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::WalletError;
use crate::models::{Money, Order, Payout};

use super::view::{ViewState, WalletSnapshot, WalletTab};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load wallet data. Please try again.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";
pub const NO_ORDERS_MESSAGE: &str = "You haven't sold any orders yet.";
pub const NO_PAYOUTS_MESSAGE: &str = "You haven't made any payout requests yet.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenState {
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceLines {
    pub available: String,
    pub pending: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayoutAction {
    pub label: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRow {
    pub id: String,
    pub product: String,
    pub amount: String,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayoutRow {
    pub id: String,
    pub amount: String,
    pub status: String,
    pub created_at: String,
    pub arrival_date: Option<String>,
}

/// What the wallet page shows, derived purely from view state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletScreen {
    pub state: ScreenState,
    pub tab: WalletTab,
    pub balance: Option<BalanceLines>,
    /// Absent when there is nothing to pay out.
    pub payout_action: Option<PayoutAction>,
    pub sold_orders: Option<Vec<OrderRow>>,
    pub payouts: Option<Vec<PayoutRow>>,
    pub empty_message: Option<String>,
    pub error: Option<String>,
}

impl WalletScreen {
    fn bare(state: ScreenState, tab: WalletTab) -> Self {
        Self {
            state,
            tab,
            balance: None,
            payout_action: None,
            sold_orders: None,
            payouts: None,
            empty_message: None,
            error: None,
        }
    }
}

pub fn render(state: &ViewState, tab: WalletTab, payout_in_flight: bool) -> WalletScreen {
    match state {
        ViewState::Loading => WalletScreen::bare(ScreenState::Loading, tab),
        ViewState::Error(e) => {
            let mut screen = WalletScreen::bare(ScreenState::Error, tab);
            screen.error = Some(error_message(e).to_string());
            screen
        }
        ViewState::Ready(snapshot) => render_ready(snapshot, tab, payout_in_flight),
    }
}

fn error_message(e: &WalletError) -> &'static str {
    match e {
        WalletError::Unauthenticated => SESSION_EXPIRED_MESSAGE,
        _ => LOAD_FAILED_MESSAGE,
    }
}

fn render_ready(snapshot: &WalletSnapshot, tab: WalletTab, payout_in_flight: bool) -> WalletScreen {
    let balance = &snapshot.balance;
    let mut screen = WalletScreen::bare(ScreenState::Ready, tab);

    screen.balance = Some(BalanceLines {
        available: balance.available.to_string(),
        pending: balance.pending.to_string(),
    });

    if balance.can_request_payout() {
        screen.payout_action = Some(if payout_in_flight {
            PayoutAction {
                label: "Requesting payout...".into(),
                enabled: false,
            }
        } else {
            PayoutAction {
                label: format!("Request payout of {}", balance.available),
                enabled: true,
            }
        });
    }

    let currency = balance.available.currency.as_str();
    match tab {
        WalletTab::Orders if snapshot.sold_orders.is_empty() => {
            screen.empty_message = Some(NO_ORDERS_MESSAGE.into());
        }
        WalletTab::Orders => {
            screen.sold_orders = Some(
                snapshot
                    .sold_orders
                    .iter()
                    .map(|o| order_row(o, currency))
                    .collect(),
            );
        }
        WalletTab::Payouts if snapshot.payouts.is_empty() => {
            screen.empty_message = Some(NO_PAYOUTS_MESSAGE.into());
        }
        WalletTab::Payouts => {
            screen.payouts = Some(
                snapshot
                    .payouts
                    .iter()
                    .map(|p| payout_row(p, currency))
                    .collect(),
            );
        }
    }

    screen
}

fn display_amount(amount: i64, currency: &str) -> String {
    // Historic rows may carry refunds as negative amounts; keep the sign.
    match Money::new(amount.checked_abs().unwrap_or(i64::MAX), currency) {
        Ok(m) if amount < 0 => {
            format!("{} -{:.2}", m.currency.to_ascii_uppercase(), m.major_units())
        }
        Ok(m) => m.to_string(),
        Err(_) => amount.to_string(),
    }
}

fn display_date(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

fn order_row(order: &Order, currency: &str) -> OrderRow {
    OrderRow {
        id: order.id.clone(),
        product: order.product_title().to_string(),
        amount: display_amount(order.amount, currency),
        status: order.status.label().to_string(),
        created_at: display_date(&order.created_at),
    }
}

fn payout_row(payout: &Payout, fallback_currency: &str) -> PayoutRow {
    let currency = payout.currency.as_deref().unwrap_or(fallback_currency);
    PayoutRow {
        id: payout.id.clone(),
        amount: display_amount(payout.amount, currency),
        status: payout.status.label().to_string(),
        created_at: display_date(&payout.created_at),
        arrival_date: payout.arrival_date.as_ref().map(display_date),
    }
}
