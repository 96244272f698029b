//! Persistence seam of the ledger.
//!
//! The engine never talks to a database directly: every read and write goes
//! through a [`LedgerStore`]. Two implementations are provided:
//!
//! - [`SqlStore`]: sea-orm over SQLite, the production store.
//! - [`MemoryStore`]: a process-local store for tests and ephemeral runs.

use async_trait::async_trait;

use crate::{HistoryOrder, Money, ResultEngine, TransactionRecord, Wallet, WalletId};

mod memory;
mod sql;

pub use memory::MemoryStore;
pub use sql::SqlStore;

/// Durable keyed storage for wallets and their transaction history.
///
/// Each method is atomic with respect to itself. Implementations must never
/// let a wallet balance become observable below zero.
#[async_trait]
pub trait LedgerStore: Send + Sync + std::fmt::Debug {
    /// Persist a new wallet with `initial_balance`.
    async fn create_wallet(&self, id: WalletId, initial_balance: Money) -> ResultEngine<Wallet>;

    /// Load a wallet; `Ok(None)` means it does not exist.
    async fn get_wallet(&self, id: WalletId) -> ResultEngine<Option<Wallet>>;

    /// Atomically debit `from`, credit `to` and append one transaction record.
    ///
    /// Fails with `SenderNotFound`, `RecipientNotFound` or `InsufficientFunds`
    /// (checked in that order) without mutating anything.
    async fn apply_transfer(
        &self,
        from: WalletId,
        to: WalletId,
        amount: Money,
    ) -> ResultEngine<TransactionRecord>;

    /// Every transaction where `wallet_id` is sender or recipient, sorted by
    /// commit sequence.
    async fn get_transactions(
        &self,
        wallet_id: WalletId,
        order: HistoryOrder,
    ) -> ResultEngine<Vec<TransactionRecord>>;

    /// Cheap liveness probe.
    async fn ping(&self) -> ResultEngine<()>;
}
