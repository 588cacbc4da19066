use crate::error::{Result, WifiPayError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The mobile-money providers a customer can pay with.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub enum PaymentMethod {
    #[serde(rename = "mtn", alias = "provider-a")]
    MtnMoney,
    #[serde(rename = "airtel", alias = "provider-b")]
    AirtelMoney,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::MtnMoney => "mtn",
            PaymentMethod::AirtelMoney => "airtel",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::MtnMoney => "MTN Mobile Money",
            PaymentMethod::AirtelMoney => "Airtel Money",
        }
    }

    /// Prefix of the transaction ids the provider hands back.
    pub fn transaction_prefix(&self) -> &'static str {
        match self {
            PaymentMethod::MtnMoney => "MTN",
            PaymentMethod::AirtelMoney => "ATL",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for PaymentMethod {
    type Err = WifiPayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mtn" | "provider-a" => Ok(PaymentMethod::MtnMoney),
            "airtel" | "provider-b" => Ok(PaymentMethod::AirtelMoney),
            other => Err(WifiPayError::ValidationError(format!(
                "Unknown payment method: {other}"
            ))),
        }
    }
}
