pub mod api;
pub mod bookify;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod services;
pub mod session;
pub mod wallet;

use std::sync::Arc;

use crate::bookify::BookifyClient;
use crate::config::AppConfig;
use crate::services::notifier::Notifier;
use crate::session::{Session, SessionRegistry};
use crate::wallet::{PayoutRequester, WalletView};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub bookify: BookifyClient,
    pub notifier: Notifier,
    pub payouts: Arc<PayoutRequester>,
    pub sessions: SessionRegistry,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    ) -> Self {
        let bookify = BookifyClient::new(
            reqwest::Client::new(),
            config.bookify_api_url.clone(),
            config.bookify_api_key.clone(),
        );
        let notifier = Notifier::new(config.notification_capacity);
        let payouts = Arc::new(PayoutRequester::new(bookify.clone(), notifier.clone()));

        Self {
            config,
            bookify,
            notifier,
            payouts,
            sessions: SessionRegistry::new(),
            metrics_handle,
        }
    }

    /// A fresh wallet view bound to `session`.
    pub fn wallet_view(&self, session: Session) -> WalletView {
        WalletView::new(self.bookify.clone(), session, Arc::clone(&self.payouts))
    }
}
