//! Per-wallet mutual exclusion for transfers.
//!
//! Every transfer holds the locks of both its wallets while the store applies
//! it. Locks are always taken in ascending [`WalletId`] order, so two
//! transfers over the same pair in opposite directions cannot deadlock, and
//! transfers over disjoint pairs never wait on each other.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::WalletId;

#[derive(Debug, Default)]
pub(crate) struct WalletLocks {
    registry: Mutex<HashMap<WalletId, Arc<Mutex<()>>>>,
}

/// Holds the locks of a transfer's wallets until dropped.
#[derive(Debug)]
pub(crate) struct PairGuard {
    _first: OwnedMutexGuard<()>,
    _second: Option<OwnedMutexGuard<()>>,
}

impl WalletLocks {
    /// Lock handle for `id`, dropping handles nobody holds or waits on.
    async fn handle(&self, id: WalletId) -> Arc<Mutex<()>> {
        let mut registry = self.registry.lock().await;
        registry.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(registry.entry(id).or_default())
    }

    pub(crate) async fn lock_pair(&self, a: WalletId, b: WalletId) -> PairGuard {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };

        let first_lock = self.handle(first).await;
        let second_lock = if first == second {
            None
        } else {
            Some(self.handle(second).await)
        };

        let first_guard = first_lock.lock_owned().await;
        let second_guard = match second_lock {
            Some(lock) => Some(lock.lock_owned().await),
            None => None,
        };
        PairGuard {
            _first: first_guard,
            _second: second_guard,
        }
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        let mut registry = self.registry.lock().await;
        registry.retain(|_, lock| Arc::strong_count(lock) > 1);
        registry.len()
    }
}
