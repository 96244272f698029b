//! The module contains `Wallet` struct and its implementation.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

/// Stable identifier of a wallet.
///
/// Generated once by the engine (never supplied by callers) and persisted as
/// its hyphenated string form. The total order is the lock acquisition order
/// used by transfers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletId(Uuid);

impl WalletId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for WalletId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for WalletId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// A wallet.
///
/// Holds a non-negative balance in a single implicit currency. Wallets are
/// created by [`Engine::create_wallet`](crate::Engine::create_wallet), mutated
/// only by transfers and never deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub balance: Money,
    pub created_at: DateTime<Utc>,
}

impl Wallet {
    pub fn with_id(id: WalletId, balance: Money) -> Self {
        Self {
            id,
            balance,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub balance: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Wallet> for ActiveModel {
    fn from(value: &Wallet) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            balance: ActiveValue::Set(value.balance.minor()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Wallet {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        let id = model.id.parse::<WalletId>().map_err(|_| {
            EngineError::StoreUnavailable(format!("corrupted wallet id {:?}", model.id))
        })?;
        if model.balance < 0 {
            return Err(EngineError::StoreUnavailable(format!(
                "wallet {id} has a negative stored balance"
            )));
        }
        Ok(Self {
            id,
            balance: Money::new(model.balance),
            created_at: model.created_at,
        })
    }
}
