use api_types::error::ErrorBody;
use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

pub use server::{router, run, run_with_listener, shutdown_signal, spawn_with_listener};

mod server;
mod wallets;

pub mod types {
    pub mod wallet {
        pub use api_types::wallet::{
            HistoryOrder, HistoryQuery, SendMoney, TransactionView, WalletView,
        };
    }

    pub use api_types::{Amount, error::ErrorBody};
}

pub enum ServerError {
    Engine(EngineError),
    /// A path or body id that names no wallet.
    NotFound(String),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::WalletNotFound(_)
        | EngineError::SenderNotFound(_)
        | EngineError::RecipientNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::InsufficientFunds { .. } | EngineError::InvalidTransfer(_) => {
            StatusCode::BAD_REQUEST
        }
        EngineError::StoreUnavailable(_) | EngineError::Timeout(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::StoreUnavailable(_) | EngineError::Timeout(_) => {
            tracing::error!("request failed: {err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::NotFound(err) => (StatusCode::NOT_FOUND, err),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(value: QueryRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use engine::{Money, WalletId};

    use super::*;

    #[test]
    fn engine_not_found_kinds_map_to_404() {
        let id = WalletId::new();
        for err in [
            EngineError::WalletNotFound(id),
            EngineError::SenderNotFound(id),
            EngineError::RecipientNotFound(id),
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn engine_rejections_map_to_400() {
        let res = ServerError::from(EngineError::InsufficientFunds {
            wallet_id: WalletId::new(),
            available: Money::new(1),
            requested: Money::new(2),
        })
        .into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = ServerError::from(EngineError::InvalidTransfer("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn engine_failures_map_to_500() {
        let res =
            ServerError::from(EngineError::StoreUnavailable("disk".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let res = ServerError::from(EngineError::Timeout(Duration::from_secs(1))).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn failure_details_are_not_leaked() {
        let message =
            message_for_engine_error(EngineError::StoreUnavailable("secret path".to_string()));
        assert_eq!(message, "internal server error");
    }

    #[test]
    fn not_found_maps_to_404() {
        let res = ServerError::NotFound("x".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
