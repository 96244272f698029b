//! The module contains the error the engine can throw.
//!
//! Not-found and insufficient-funds outcomes are expected, caller-facing
//! results and each has its own variant so the transport can render them
//! precisely. Infrastructure failures collapse into [`StoreUnavailable`] or
//! [`Timeout`].
//!
//!  [`StoreUnavailable`]: EngineError::StoreUnavailable
//!  [`Timeout`]: EngineError::Timeout
use std::time::Duration;

use sea_orm::DbErr;
use thiserror::Error;

use crate::{Money, WalletId};

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("wallet {0} not found")]
    WalletNotFound(WalletId),
    #[error("sender wallet {0} not found")]
    SenderNotFound(WalletId),
    #[error("recipient wallet {0} not found")]
    RecipientNotFound(WalletId),
    #[error("insufficient funds in wallet {wallet_id}: available {available}, requested {requested}")]
    InsufficientFunds {
        wallet_id: WalletId,
        available: Money,
        requested: Money,
    },
    #[error("invalid transfer: {0}")]
    InvalidTransfer(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),
}

impl EngineError {
    /// Returns `true` for outcomes caused by the request itself rather than
    /// by the infrastructure.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::StoreUnavailable(_) | Self::Timeout(_))
    }
}

impl From<DbErr> for EngineError {
    fn from(err: DbErr) -> Self {
        tracing::error!("database error: {err}");
        Self::StoreUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_errors_become_store_unavailable() {
        let err = EngineError::from(DbErr::Custom("disk full".to_string()));
        assert!(matches!(err, EngineError::StoreUnavailable(ref msg) if msg.contains("disk full")));
        assert!(!err.is_rejection());
    }

    #[test]
    fn rejections_are_not_infrastructure_faults() {
        let id = WalletId::new();
        assert!(EngineError::SenderNotFound(id).is_rejection());
        assert!(EngineError::InvalidTransfer("x".to_string()).is_rejection());
        assert!(!EngineError::Timeout(Duration::from_secs(1)).is_rejection());
    }
}
