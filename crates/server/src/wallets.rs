//! Wallet API endpoints.

use api_types::{
    Amount,
    wallet::{HistoryOrder, HistoryQuery, SendMoney, TransactionView, WalletView},
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use engine::{EngineError, Money, TransactionRecord, TransferCmd, Wallet, WalletId};

use crate::{ServerError, server::ServerState};

fn wallet_view(wallet: &Wallet) -> WalletView {
    WalletView {
        id: *wallet.id.as_uuid(),
        balance: Amount::from_minor(wallet.balance.minor()),
    }
}

fn transaction_view(record: &TransactionRecord) -> TransactionView {
    TransactionView {
        id: *record.id.as_uuid(),
        from: *record.from.as_uuid(),
        to: *record.to.as_uuid(),
        amount: Amount::from_minor(record.amount.minor()),
        timestamp: record.occurred_at,
    }
}

/// Ids that do not parse can name no wallet.
fn parse_wallet_id(raw: &str, role: &str) -> Result<WalletId, ServerError> {
    raw.parse()
        .map_err(|_| ServerError::NotFound(format!("{role} wallet {raw:?} not found")))
}

/// Handle requests for creating a new wallet with the opening balance.
pub async fn wallet_new(State(state): State<ServerState>) -> Result<Json<WalletView>, ServerError> {
    let wallet = state.engine.create_wallet().await?;
    Ok(Json(wallet_view(&wallet)))
}

pub async fn status(
    State(state): State<ServerState>,
    Path(wallet_id): Path<String>,
) -> Result<Json<WalletView>, ServerError> {
    let wallet_id = parse_wallet_id(&wallet_id, "requested")?;
    let wallet = state.engine.wallet_status(wallet_id).await?;
    Ok(Json(wallet_view(&wallet)))
}

/// Handle transfers from the wallet in the path to `payload.to`.
///
/// Answers 200 with an empty body once the transfer is committed.
pub async fn send(
    State(state): State<ServerState>,
    Path(wallet_id): Path<String>,
    payload: Result<Json<SendMoney>, JsonRejection>,
) -> Result<StatusCode, ServerError> {
    let from = parse_wallet_id(&wallet_id, "sender")?;
    let Json(payload) = payload?;

    let to = match payload.to.parse::<WalletId>() {
        Ok(to) => to,
        Err(_) => {
            // Keep the sender-first ordering of failures.
            state
                .engine
                .wallet_status(from)
                .await
                .map_err(|err| match err {
                    EngineError::WalletNotFound(id) => EngineError::SenderNotFound(id),
                    other => other,
                })?;
            return Err(ServerError::NotFound(format!(
                "recipient wallet {:?} not found",
                payload.to
            )));
        }
    };

    state
        .engine
        .transfer(TransferCmd::new(
            from,
            to,
            Money::new(payload.amount.minor()),
        ))
        .await?;

    Ok(StatusCode::OK)
}

pub async fn history(
    State(state): State<ServerState>,
    Path(wallet_id): Path<String>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let wallet_id = parse_wallet_id(&wallet_id, "requested")?;
    let Query(query) = query?;

    let records = match query.order {
        Some(order) => {
            let order = match order {
                HistoryOrder::OldestFirst => engine::HistoryOrder::OldestFirst,
                HistoryOrder::NewestFirst => engine::HistoryOrder::NewestFirst,
            };
            state.engine.history_ordered(wallet_id, order).await?
        }
        None => state.engine.history(wallet_id).await?,
    };

    Ok(Json(records.iter().map(transaction_view).collect()))
}
