pub mod client;
pub mod types;

pub use client::{BookifyClient, BookifyClientError};
pub use types::{ApiBalance, ApiMoney, ConnectResponse, ListResponse};
