use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{Order, Payout};
use crate::session::Session;

use super::types::{ApiBalance, ConnectResponse, ListResponse};

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Error)]
pub enum BookifyClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("session rejected by backend")]
    Unauthorized,

    #[error("backend returned {0}")]
    Status(StatusCode),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// HTTP client for the Bookify backend's `/stripe` endpoints.
///
/// Every request carries the static API key and the seller's session token.
/// Timeouts are left to the reqwest defaults.
#[derive(Debug, Clone)]
pub struct BookifyClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl BookifyClient {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request with the API key and session credentials attached.
    fn authenticated(&self, method: Method, path: &str, session: &Session) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.http
            .request(method, &url)
            .header(API_KEY_HEADER, &self.api_key)
            .bearer_auth(session.token())
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, BookifyClientError> {
        let resp = req.send().await?;
        match resp.status() {
            StatusCode::UNAUTHORIZED => Err(BookifyClientError::Unauthorized),
            status if !status.is_success() => Err(BookifyClientError::Status(status)),
            _ => Ok(resp),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        session: &Session,
    ) -> Result<T, BookifyClientError> {
        let resp = self
            .send(self.authenticated(Method::GET, path, session))
            .await?;
        let body = resp.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| BookifyClientError::Unexpected(format!("{path}: {e}")))
    }

    /// GET /stripe/balance — raw available/pending arrays.
    pub async fn get_balance(&self, session: &Session) -> Result<ApiBalance, BookifyClientError> {
        self.get_json("/stripe/balance", session).await
    }

    /// GET /stripe/orders/sold/ — every order where the session is the seller.
    pub async fn get_sold_orders(
        &self,
        session: &Session,
    ) -> Result<Vec<Order>, BookifyClientError> {
        let list: ListResponse<Order> = self.get_json("/stripe/orders/sold/", session).await?;
        Ok(list.data)
    }

    /// GET /stripe/payouts/ — payout history.
    pub async fn get_payouts(&self, session: &Session) -> Result<Vec<Payout>, BookifyClientError> {
        let list: ListResponse<Payout> = self.get_json("/stripe/payouts/", session).await?;
        Ok(list.data)
    }

    /// POST /stripe/payouts/create — pay out the whole available balance.
    pub async fn create_payout(&self, session: &Session) -> Result<(), BookifyClientError> {
        self.send(self.authenticated(Method::POST, "/stripe/payouts/create", session))
            .await?;
        Ok(())
    }

    /// POST /stripe/connect — onboarding redirect URL for the seller.
    pub async fn connect_account(&self, session: &Session) -> Result<String, BookifyClientError> {
        let resp = self
            .send(self.authenticated(Method::POST, "/stripe/connect", session))
            .await?;
        let body = resp.text().await?;
        let connect: ConnectResponse = serde_json::from_str(&body)
            .map_err(|e| BookifyClientError::Unexpected(format!("/stripe/connect: {e}")))?;

        if connect.url.trim().is_empty() {
            return Err(BookifyClientError::Unexpected(
                "/stripe/connect: empty onboarding url".into(),
            ));
        }
        Ok(connect.url)
    }
}
