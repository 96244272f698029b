//! Command structs for engine operations.

use crate::{Money, WalletId};

/// Move `amount` from one wallet to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferCmd {
    pub from: WalletId,
    pub to: WalletId,
    pub amount: Money,
}

impl TransferCmd {
    #[must_use]
    pub fn new(from: WalletId, to: WalletId, amount: Money) -> Self {
        Self { from, to, amount }
    }
}
