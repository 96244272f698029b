use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    EngineError, HistoryOrder, Money, ResultEngine, TransactionRecord, Wallet, WalletId,
};

use super::LedgerStore;

/// In-process [`LedgerStore`].
///
/// All state sits behind a single `RwLock`; a transfer runs entirely under
/// the write half, so readers never observe a debit without its credit.
/// Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    wallets: HashMap<WalletId, Wallet>,
    /// Append-only, kept in commit order.
    transactions: Vec<TransactionRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn create_wallet(&self, id: WalletId, initial_balance: Money) -> ResultEngine<Wallet> {
        if initial_balance.is_negative() {
            return Err(EngineError::InvalidTransfer(
                "initial balance must be >= 0".to_string(),
            ));
        }
        let mut state = self.state.write().await;
        if state.wallets.contains_key(&id) {
            return Err(EngineError::StoreUnavailable(format!(
                "wallet {id} already exists"
            )));
        }
        let wallet = Wallet::with_id(id, initial_balance);
        state.wallets.insert(id, wallet.clone());
        Ok(wallet)
    }

    async fn get_wallet(&self, id: WalletId) -> ResultEngine<Option<Wallet>> {
        Ok(self.state.read().await.wallets.get(&id).cloned())
    }

    async fn apply_transfer(
        &self,
        from: WalletId,
        to: WalletId,
        amount: Money,
    ) -> ResultEngine<TransactionRecord> {
        let mut state = self.state.write().await;

        let sender_balance = state
            .wallets
            .get(&from)
            .map(|w| w.balance)
            .ok_or(EngineError::SenderNotFound(from))?;
        let recipient_balance = state
            .wallets
            .get(&to)
            .map(|w| w.balance)
            .ok_or(EngineError::RecipientNotFound(to))?;
        if sender_balance < amount {
            return Err(EngineError::InsufficientFunds {
                wallet_id: from,
                available: sender_balance,
                requested: amount,
            });
        }

        // Compute both sides before touching anything.
        let new_sender = sender_balance
            .checked_sub(amount)
            .ok_or_else(|| EngineError::InvalidTransfer("amount overflow".to_string()))?;
        let new_recipient = recipient_balance.checked_add(amount).ok_or_else(|| {
            EngineError::InvalidTransfer(format!("balance overflow on wallet {to}"))
        })?;

        let sequence = state.transactions.len() as i64 + 1;
        let record = TransactionRecord::new(sequence, from, to, amount, Utc::now());

        if let Some(sender) = state.wallets.get_mut(&from) {
            sender.balance = new_sender;
        }
        if let Some(recipient) = state.wallets.get_mut(&to) {
            recipient.balance = new_recipient;
        }
        state.transactions.push(record.clone());

        Ok(record)
    }

    async fn get_transactions(
        &self,
        wallet_id: WalletId,
        order: HistoryOrder,
    ) -> ResultEngine<Vec<TransactionRecord>> {
        let state = self.state.read().await;
        let matching = state
            .transactions
            .iter()
            .filter(|tx| tx.involves(wallet_id))
            .cloned();
        Ok(match order {
            HistoryOrder::OldestFirst => matching.collect(),
            HistoryOrder::NewestFirst => matching.rev().collect(),
        })
    }

    async fn ping(&self) -> ResultEngine<()> {
        Ok(())
    }
}
