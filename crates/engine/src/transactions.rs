//! Transaction history primitives.
//!
//! A `TransactionRecord` is the immutable trace of one committed transfer. It
//! is written in the same store transaction as the balance mutation it
//! records and never updated afterwards.

use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, WalletId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Order in which a wallet history is returned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOrder {
    /// Commit order, oldest transfer first.
    #[default]
    OldestFirst,
    NewestFirst,
}

/// How a transfer affects a given wallet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Outgoing,
    Incoming,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    /// Strictly increasing commit counter assigned by the store.
    pub sequence: i64,
    pub from: WalletId,
    pub to: WalletId,
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
}

impl TransactionRecord {
    pub(crate) fn new(
        sequence: i64,
        from: WalletId,
        to: WalletId,
        amount: Money,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            sequence,
            from,
            to,
            amount,
            occurred_at,
        }
    }

    /// Returns `true` if `wallet_id` is the sender or the recipient.
    pub fn involves(&self, wallet_id: WalletId) -> bool {
        self.from == wallet_id || self.to == wallet_id
    }

    /// Direction of the transfer relative to `wallet_id`, if it is involved.
    pub fn direction(&self, wallet_id: WalletId) -> Option<Direction> {
        if self.from == wallet_id {
            Some(Direction::Outgoing)
        } else if self.to == wallet_id {
            Some(Direction::Incoming)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub sequence: i64,
    pub from_wallet_id: String,
    pub to_wallet_id: String,
    pub amount: i64,
    pub occurred_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::FromWalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Sender,
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::ToWalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Recipient,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&TransactionRecord> for ActiveModel {
    fn from(tx: &TransactionRecord) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            sequence: ActiveValue::Set(tx.sequence),
            from_wallet_id: ActiveValue::Set(tx.from.to_string()),
            to_wallet_id: ActiveValue::Set(tx.to.to_string()),
            amount: ActiveValue::Set(tx.amount.minor()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
        }
    }
}

impl TryFrom<Model> for TransactionRecord {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        let corrupted =
            |field: &str| EngineError::StoreUnavailable(format!("corrupted transaction {field}"));
        Ok(Self {
            id: TransactionId(Uuid::parse_str(&model.id).map_err(|_| corrupted("id"))?),
            sequence: model.sequence,
            from: model
                .from_wallet_id
                .parse()
                .map_err(|_| corrupted("sender"))?,
            to: model
                .to_wallet_id
                .parse()
                .map_err(|_| corrupted("recipient"))?,
            amount: Money::new(model.amount),
            occurred_at: model.occurred_at,
        })
    }
}
