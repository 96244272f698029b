//! Wallet ledger engine.
//!
//! The engine owns the rules of the ledger: wallets never go negative, a
//! transfer applies completely or not at all, and concurrent transfers that
//! touch the same wallet are serialized. Persistence is delegated to a
//! [`LedgerStore`]; the engine keeps no balances of its own between calls.

pub use commands::TransferCmd;
pub use error::EngineError;
pub use money::{MINOR_PER_UNIT, Money};
pub use ops::{Engine, EngineBuilder, EngineSettings};
pub use store::{LedgerStore, MemoryStore, SqlStore};
pub use transactions::{Direction, HistoryOrder, TransactionId, TransactionRecord};
pub use wallets::{Wallet, WalletId};

mod commands;
mod error;
mod money;
mod ops;
mod store;
mod transactions;
mod wallets;

pub type ResultEngine<T> = Result<T, EngineError>;
