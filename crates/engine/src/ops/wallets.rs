use crate::{EngineError, ResultEngine, Wallet, WalletId};

use super::Engine;

impl Engine {
    /// Create a wallet with a fresh identifier and the configured opening
    /// balance.
    ///
    /// Nothing becomes visible unless the store durably records the wallet.
    #[tracing::instrument(skip(self))]
    pub async fn create_wallet(&self) -> ResultEngine<Wallet> {
        let id = WalletId::new();
        let wallet = self
            .bounded(
                "create_wallet",
                self.store.create_wallet(id, self.settings.initial_balance),
            )
            .await?;
        tracing::info!(wallet_id = %wallet.id, balance = %wallet.balance, "wallet created");
        Ok(wallet)
    }

    /// Return the last committed state of a wallet, read from the store.
    #[tracing::instrument(skip(self))]
    pub async fn wallet_status(&self, wallet_id: WalletId) -> ResultEngine<Wallet> {
        self.bounded("wallet_status", self.store.get_wallet(wallet_id))
            .await?
            .ok_or(EngineError::WalletNotFound(wallet_id))
    }
}
