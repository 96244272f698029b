use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    Condition, ConnectionTrait, DatabaseConnection, DatabaseTransaction, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    EngineError, HistoryOrder, Money, ResultEngine, TransactionRecord, Wallet, WalletId,
    transactions, wallets,
};

use super::LedgerStore;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result: ResultEngine<_> = async { $body }.await;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = $tx.rollback().await {
                    tracing::error!("rollback failed: {rollback_err}");
                }
                Err(err)
            }
        }
    }};
}

/// [`LedgerStore`] backed by a sea-orm connection.
///
/// Transfers run in a single database transaction whose first statement is
/// the guarded debit, so the write lock is taken before anything is read and
/// two writers never deadlock on a lock upgrade.
#[derive(Debug, Clone)]
pub struct SqlStore {
    database: DatabaseConnection,
}

impl SqlStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    async fn find_wallet<C: ConnectionTrait>(
        conn: &C,
        id: WalletId,
    ) -> ResultEngine<Option<wallets::Model>> {
        Ok(wallets::Entity::find_by_id(id.to_string()).one(conn).await?)
    }

    /// Explain why the guarded debit matched no row.
    async fn debit_rejection(
        db_tx: &DatabaseTransaction,
        from: WalletId,
        to: WalletId,
        amount: Money,
    ) -> EngineError {
        let sender = match Self::find_wallet(db_tx, from).await {
            Ok(Some(sender)) => sender,
            Ok(None) => return EngineError::SenderNotFound(from),
            Err(err) => return err,
        };
        match Self::find_wallet(db_tx, to).await {
            Ok(Some(_)) => EngineError::InsufficientFunds {
                wallet_id: from,
                available: Money::new(sender.balance),
                requested: amount,
            },
            Ok(None) => EngineError::RecipientNotFound(to),
            Err(err) => err,
        }
    }

    /// Explain why the guarded credit matched no row.
    async fn credit_rejection(db_tx: &DatabaseTransaction, to: WalletId) -> EngineError {
        match Self::find_wallet(db_tx, to).await {
            Ok(Some(_)) => {
                EngineError::InvalidTransfer(format!("balance overflow on wallet {to}"))
            }
            Ok(None) => EngineError::RecipientNotFound(to),
            Err(err) => err,
        }
    }

    async fn next_sequence(db_tx: &DatabaseTransaction) -> ResultEngine<i64> {
        let current: Option<Option<i64>> = transactions::Entity::find()
            .select_only()
            .column_as(transactions::Column::Sequence.max(), "max_sequence")
            .into_tuple()
            .one(db_tx)
            .await?;
        Ok(current.flatten().unwrap_or(0) + 1)
    }
}

#[async_trait]
impl LedgerStore for SqlStore {
    async fn create_wallet(&self, id: WalletId, initial_balance: Money) -> ResultEngine<Wallet> {
        if initial_balance.is_negative() {
            return Err(EngineError::InvalidTransfer(
                "initial balance must be >= 0".to_string(),
            ));
        }
        let wallet = Wallet::with_id(id, initial_balance);
        with_tx!(self, |db_tx| {
            let model = wallets::ActiveModel::from(&wallet).insert(&db_tx).await?;
            Wallet::try_from(model)
        })
    }

    async fn get_wallet(&self, id: WalletId) -> ResultEngine<Option<Wallet>> {
        Self::find_wallet(&self.database, id)
            .await?
            .map(Wallet::try_from)
            .transpose()
    }

    async fn apply_transfer(
        &self,
        from: WalletId,
        to: WalletId,
        amount: Money,
    ) -> ResultEngine<TransactionRecord> {
        with_tx!(self, |db_tx| {
            let debited = wallets::Entity::update_many()
                .col_expr(
                    wallets::Column::Balance,
                    Expr::col(wallets::Column::Balance).sub(amount.minor()),
                )
                .filter(wallets::Column::Id.eq(from.to_string()))
                .filter(wallets::Column::Balance.gte(amount.minor()))
                .exec(&db_tx)
                .await?;
            if debited.rows_affected == 0 {
                Err(Self::debit_rejection(&db_tx, from, to, amount).await)
            } else {
                let credited = wallets::Entity::update_many()
                    .col_expr(
                        wallets::Column::Balance,
                        Expr::col(wallets::Column::Balance).add(amount.minor()),
                    )
                    .filter(wallets::Column::Id.eq(to.to_string()))
                    .filter(wallets::Column::Balance.lte(i64::MAX - amount.minor()))
                    .exec(&db_tx)
                    .await?;
                if credited.rows_affected == 0 {
                    // The debit above is undone by the rollback.
                    Err(Self::credit_rejection(&db_tx, to).await)
                } else {
                    let sequence = Self::next_sequence(&db_tx).await?;
                    let record = TransactionRecord::new(sequence, from, to, amount, Utc::now());
                    transactions::ActiveModel::from(&record)
                        .insert(&db_tx)
                        .await?;
                    Ok(record)
                }
            }
        })
    }

    async fn get_transactions(
        &self,
        wallet_id: WalletId,
        order: HistoryOrder,
    ) -> ResultEngine<Vec<TransactionRecord>> {
        let id = wallet_id.to_string();
        let query = transactions::Entity::find().filter(
            Condition::any()
                .add(transactions::Column::FromWalletId.eq(id.clone()))
                .add(transactions::Column::ToWalletId.eq(id)),
        );
        let query = match order {
            HistoryOrder::OldestFirst => query.order_by_asc(transactions::Column::Sequence),
            HistoryOrder::NewestFirst => query.order_by_desc(transactions::Column::Sequence),
        };

        query
            .all(&self.database)
            .await?
            .into_iter()
            .map(TransactionRecord::try_from)
            .collect()
    }

    async fn ping(&self) -> ResultEngine<()> {
        Ok(self.database.ping().await?)
    }
}
