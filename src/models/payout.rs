use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::{deserialize_optional_timestamp, deserialize_timestamp};

/// Payout lifecycle. The processor's own vocabulary (`paid`, `in_transit`,
/// `canceled`) folds into these three states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PayoutStatus {
    Pending,
    Completed,
    Failed,
}

impl PayoutStatus {
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" | "IN_TRANSIT" => Some(PayoutStatus::Pending),
            "COMPLETED" | "PAID" => Some(PayoutStatus::Completed),
            "FAILED" | "CANCELED" | "CANCELLED" => Some(PayoutStatus::Failed),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PayoutStatus::Pending => "Pending",
            PayoutStatus::Completed => "Completed",
            PayoutStatus::Failed => "Failed",
        }
    }
}

impl<'de> Deserialize<'de> for PayoutStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        PayoutStatus::from_api_str(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown payout status {raw:?}")))
    }
}

impl fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A withdrawal of available balance to the seller's bank account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub amount: i64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub stripe_payout_id: Option<String>,
    pub status: PayoutStatus,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub arrival_date: Option<DateTime<Utc>>,
}
