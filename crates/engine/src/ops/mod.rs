use std::{future::Future, sync::Arc, time::Duration};

use sea_orm::DatabaseConnection;

use crate::{EngineError, HistoryOrder, LedgerStore, Money, ResultEngine, SqlStore};

use locks::WalletLocks;

mod history;
mod locks;
mod transfer;
mod wallets;

/// Tunables of the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineSettings {
    /// Balance every new wallet starts with.
    pub initial_balance: Money,
    /// Upper bound for any single operation, lock waits included.
    pub operation_timeout: Duration,
    /// Default ordering of wallet histories.
    pub history_order: HistoryOrder,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            initial_balance: Money::new(100 * crate::MINOR_PER_UNIT),
            operation_timeout: Duration::from_secs(5),
            history_order: HistoryOrder::OldestFirst,
        }
    }
}

/// Entry point of the ledger: wallet creation, queries and transfers.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
#[derive(Debug)]
pub struct Engine {
    store: Arc<dyn LedgerStore>,
    locks: WalletLocks,
    settings: EngineSettings,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Await `operation`, failing with [`EngineError::Timeout`] once the
    /// configured bound elapses. The future is dropped on timeout, which for
    /// the SQL store rolls back its open transaction.
    async fn bounded<T>(
        &self,
        op: &'static str,
        operation: impl Future<Output = ResultEngine<T>>,
    ) -> ResultEngine<T> {
        let limit = self.settings.operation_timeout;
        match tokio::time::timeout(limit, operation).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(op, ?limit, "ledger operation timed out");
                Err(EngineError::Timeout(limit))
            }
        }
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    store: Option<Arc<dyn LedgerStore>>,
    settings: EngineSettings,
}

impl EngineBuilder {
    /// Use a sea-orm database as the ledger store.
    pub fn database(self, db: DatabaseConnection) -> EngineBuilder {
        self.store(Arc::new(SqlStore::new(db)))
    }

    /// Use an arbitrary ledger store.
    pub fn store(mut self, store: Arc<dyn LedgerStore>) -> EngineBuilder {
        self.store = Some(store);
        self
    }

    pub fn settings(mut self, settings: EngineSettings) -> EngineBuilder {
        self.settings = settings;
        self
    }

    /// Construct `Engine`, checking that the store answers.
    pub async fn build(self) -> ResultEngine<Engine> {
        let store = self.store.ok_or_else(|| {
            EngineError::StoreUnavailable("no ledger store configured".to_string())
        })?;
        if self.settings.initial_balance.is_negative() {
            return Err(EngineError::InvalidTransfer(
                "initial balance must be >= 0".to_string(),
            ));
        }

        let engine = Engine {
            store,
            locks: WalletLocks::default(),
            settings: self.settings,
        };
        engine.bounded("ping", engine.store.ping()).await?;
        Ok(engine)
    }
}
