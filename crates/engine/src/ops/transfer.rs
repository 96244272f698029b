use crate::{EngineError, ResultEngine, TransactionRecord, TransferCmd};

use super::Engine;

impl Engine {
    /// Move funds between two wallets.
    ///
    /// The transfer is validated, then applied by the store while both
    /// wallet locks are held (ascending id order). Either the debit, the
    /// credit and the history record all commit, or nothing does.
    ///
    /// Failures:
    /// - `InvalidTransfer`: non-positive amount or `from == to`
    /// - `SenderNotFound` / `RecipientNotFound`
    /// - `InsufficientFunds`: the sender balance is below `amount`
    /// - `StoreUnavailable` / `Timeout`: nothing was applied
    #[tracing::instrument(
        skip(self, cmd),
        fields(from = %cmd.from, to = %cmd.to, amount = %cmd.amount)
    )]
    pub async fn transfer(&self, cmd: TransferCmd) -> ResultEngine<TransactionRecord> {
        let TransferCmd { from, to, amount } = cmd;
        if !amount.is_positive() {
            return Err(EngineError::InvalidTransfer(
                "amount must be > 0".to_string(),
            ));
        }
        if from == to {
            return Err(EngineError::InvalidTransfer(
                "sender and recipient must differ".to_string(),
            ));
        }

        let result = self
            .bounded("transfer", async {
                let _guard = self.locks.lock_pair(from, to).await;
                self.store.apply_transfer(from, to, amount).await
            })
            .await;

        match &result {
            Ok(record) => {
                tracing::info!(
                    transaction_id = %record.id,
                    sequence = record.sequence,
                    "transfer committed"
                );
            }
            Err(err) if err.is_rejection() => tracing::warn!("transfer rejected: {err}"),
            Err(err) => tracing::error!("transfer failed: {err}"),
        }
        result
    }
}
