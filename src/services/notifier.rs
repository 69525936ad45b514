use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::Money;

pub const PAYOUT_FAILED_MESSAGE: &str = "Failed to request payout. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A transient toast shown to one seller session.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub session_id: Uuid,
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    fn new(session_id: Uuid, level: NotificationLevel, message: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            level,
            message,
            created_at: Utc::now(),
        }
    }

    pub fn success(session_id: Uuid, message: impl Into<String>) -> Self {
        Self::new(session_id, NotificationLevel::Success, message.into())
    }

    pub fn error(session_id: Uuid, message: impl Into<String>) -> Self {
        Self::new(session_id, NotificationLevel::Error, message.into())
    }
}

/// Events pushed to the dashboard WebSocket of the owning session.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum WalletEvent {
    #[serde(rename = "notification")]
    Notification(Notification),

    #[serde(rename = "balance_update")]
    BalanceUpdate(BalanceUpdate),
}

impl WalletEvent {
    /// Session the event belongs to. Clients only ever see their own.
    pub fn session_id(&self) -> Uuid {
        match self {
            WalletEvent::Notification(n) => n.session_id,
            WalletEvent::BalanceUpdate(b) => b.session_id,
        }
    }
}

/// Balance figures after a post-payout refresh.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceUpdate {
    pub session_id: Uuid,
    pub available: String,
    pub pending: String,
    pub payout_enabled: bool,
}

/// Fan-out of wallet notifications to dashboard WebSocket clients.
/// Publishing never blocks and never fails the caller.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<WalletEvent>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, msg: WalletEvent) {
        let session_id = msg.session_id();
        if self.tx.send(msg).is_err() {
            tracing::debug!(seller_session = %session_id, "No dashboard subscribers for message");
        }
    }

    pub fn notify(&self, notification: Notification) {
        tracing::info!(
            seller_session = %notification.session_id,
            level = ?notification.level,
            message = %notification.message,
            "Wallet notification"
        );
        self.publish(WalletEvent::Notification(notification));
    }
}

/// `Payout of USD 19.99 requested successfully.`
pub fn format_payout_success(amount: &Money) -> String {
    format!("Payout of {amount} requested successfully.")
}
