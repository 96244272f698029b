use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Minor units (cents) per currency unit on the wire.
const SCALE: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount {0:?} is not a decimal number")]
    Malformed(String),
    #[error("amount {0:?} has more than two fractional digits")]
    TooPrecise(String),
    #[error("amount {0:?} is out of range")]
    OutOfRange(String),
}

/// A decimal amount of currency units, as exchanged over HTTP.
///
/// On the wire it is a plain JSON number (`30`, `12.5`, `0.01`). Internally
/// it is an exact count of minor units, so a value with more than two
/// fractional digits is refused instead of rounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub const fn minor(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = SCALE.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / scale, abs % scale)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || AmountError::Malformed(s.to_string());
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        // `12.50` and `12.500` are the same amount.
        let fraction = fraction.trim_end_matches('0');
        if fraction.len() > 2 {
            return Err(AmountError::TooPrecise(s.to_string()));
        }

        let out_of_range = || AmountError::OutOfRange(s.to_string());
        let whole: i64 = whole.parse().map_err(|_| out_of_range())?;
        let cents: i64 = format!("{fraction:0<2}").parse().map_err(|_| malformed())?;
        let minor = whole
            .checked_mul(SCALE)
            .and_then(|m| m.checked_add(cents))
            .ok_or_else(out_of_range)?;
        Ok(Self(if negative { -minor } else { minor }))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0 as f64 / SCALE as f64)
    }
}

/// Reads the number's literal digits (`arbitrary_precision`), so a third
/// decimal is refused instead of rounded away.
impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let number = serde_json::Number::deserialize(deserializer)?;
        number
            .to_string()
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

pub mod wallet {
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    use super::*;

    /// Body of `GET /api/v1/wallet/{walletId}` and `POST /api/v1/wallet`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletView {
        pub id: Uuid,
        pub balance: Amount,
    }

    /// Body of `POST /api/v1/wallet/{walletId}/send`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SendMoney {
        /// Recipient wallet id.
        ///
        /// Kept as text: an id that is not a UUID names no wallet and is
        /// answered like any other unknown recipient.
        pub to: String,
        pub amount: Amount,
    }

    /// One item of `GET /api/v1/wallet/{walletId}/history`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub from: Uuid,
        pub to: Uuid,
        pub amount: Amount,
        pub timestamp: DateTime<Utc>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum HistoryOrder {
        OldestFirst,
        NewestFirst,
    }

    /// Query string of the history route.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct HistoryQuery {
        /// Falls back to the server's configured order.
        pub order: Option<HistoryOrder>,
    }
}

pub mod error {
    use super::*;

    /// JSON body of every error response.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorBody {
        pub error: String,
    }
}
