use crate::{EngineError, HistoryOrder, ResultEngine, TransactionRecord, WalletId};

use super::Engine;

impl Engine {
    /// Transfers sent or received by a wallet, in the configured order.
    ///
    /// An existing wallet without transfers yields an empty list.
    pub async fn history(&self, wallet_id: WalletId) -> ResultEngine<Vec<TransactionRecord>> {
        self.history_ordered(wallet_id, self.settings.history_order)
            .await
    }

    /// Same as [`Engine::history`] with an explicit ordering.
    #[tracing::instrument(skip(self))]
    pub async fn history_ordered(
        &self,
        wallet_id: WalletId,
        order: HistoryOrder,
    ) -> ResultEngine<Vec<TransactionRecord>> {
        self.bounded("history", async {
            // Wallets are never deleted, so the existence check cannot go stale.
            if self.store.get_wallet(wallet_id).await?.is_none() {
                return Err(EngineError::WalletNotFound(wallet_id));
            }
            self.store.get_transactions(wallet_id, order).await
        })
        .await
    }
}
