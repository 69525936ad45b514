use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::{deserialize_optional_timestamp, deserialize_timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
    Failed,
    Refunded,
}

impl OrderStatus {
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Some(OrderStatus::Pending),
            "COMPLETED" | "COMPLETE" => Some(OrderStatus::Completed),
            "CANCELLED" | "CANCELED" => Some(OrderStatus::Cancelled),
            "FAILED" => Some(OrderStatus::Failed),
            "REFUNDED" => Some(OrderStatus::Refunded),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Failed => "Failed",
            OrderStatus::Refunded => "Refunded",
        }
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        OrderStatus::from_api_str(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown order status {raw:?}")))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Product summary embedded in an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderProduct {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// A sale owned by the transaction system. Read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub seller_id: Option<String>,
    #[serde(default)]
    pub buyer_id: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub product: Option<OrderProduct>,
    /// Flattened product title, sent by some backend versions.
    #[serde(default)]
    pub title: Option<String>,
    pub amount: i64,
    pub status: OrderStatus,
    #[serde(default)]
    pub checkout_session_id: Option<String>,
    #[serde(default)]
    pub payment_url: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Best available product title for display.
    pub fn product_title(&self) -> &str {
        self.product
            .as_ref()
            .and_then(|p| p.title.as_deref())
            .or(self.title.as_deref())
            .or(self.product_id.as_deref())
            .unwrap_or("Untitled")
    }
}
