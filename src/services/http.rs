use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use tokio::sync::{mpsc, oneshot};
use tower_http::trace::TraceLayer;

use super::deposits::DepositRequest;
use super::earnings::EarningRequest;
use super::users::UserRequest;
use super::withdrawals::WithdrawalRequest;
use super::ServiceError;
use crate::models::deposits::NewDeposit;
use crate::models::withdrawals::NewWithdrawal;
use crate::models::LedgerError;

mod users;

#[derive(Clone)]
struct AppState {
    user_channel: mpsc::Sender<UserRequest>,
    deposit_channel: mpsc::Sender<DepositRequest>,
    withdrawal_channel: mpsc::Sender<WithdrawalRequest>,
    earning_channel: mpsc::Sender<EarningRequest>,
}

fn error_response(service_error: ServiceError) -> (StatusCode, Json<serde_json::Value>) {
    match service_error {
        ServiceError::Validation(e) => {
            let status = match e {
                LedgerError::InvalidTransition => StatusCode::CONFLICT,
                LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            };
            (status, Json(json!({ "error": e.to_string() })))
        }
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Internal server error." })),
        ),
    }
}

fn channel_error(e: impl std::fmt::Display) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": format!("Failed to process request: {}", e) })),
    )
}

async fn submit_deposit(
    State(state): State<AppState>,
    Json(req): Json<NewDeposit>,
) -> impl IntoResponse {
    let (deposit_tx, deposit_rx) = oneshot::channel();

    let send_result = state
        .deposit_channel
        .send(DepositRequest::Submit {
            new_deposit: req,
            response: deposit_tx,
        })
        .await;
    if let Err(e) = send_result {
        return channel_error(e);
    }

    match deposit_rx.await {
        Ok(Ok(deposit)) => (StatusCode::CREATED, Json(json!(deposit))),
        Ok(Err(service_error)) => error_response(service_error),
        Err(e) => channel_error(e),
    }
}

async fn approve_deposit(
    State(state): State<AppState>,
    Path(deposit_id): Path<String>,
) -> impl IntoResponse {
    let (deposit_tx, deposit_rx) = oneshot::channel();

    let send_result = state
        .deposit_channel
        .send(DepositRequest::Approve {
            deposit_id,
            response: deposit_tx,
        })
        .await;
    if let Err(e) = send_result {
        return channel_error(e);
    }

    match deposit_rx.await {
        Ok(Ok(deposit)) => (StatusCode::OK, Json(json!(deposit))),
        Ok(Err(service_error)) => error_response(service_error),
        Err(e) => channel_error(e),
    }
}

async fn reject_deposit(
    State(state): State<AppState>,
    Path(deposit_id): Path<String>,
) -> impl IntoResponse {
    let (deposit_tx, deposit_rx) = oneshot::channel();

    let send_result = state
        .deposit_channel
        .send(DepositRequest::Reject {
            deposit_id,
            response: deposit_tx,
        })
        .await;
    if let Err(e) = send_result {
        return channel_error(e);
    }

    match deposit_rx.await {
        Ok(Ok(deposit)) => (StatusCode::OK, Json(json!(deposit))),
        Ok(Err(service_error)) => error_response(service_error),
        Err(e) => channel_error(e),
    }
}

async fn list_levels(State(state): State<AppState>) -> impl IntoResponse {
    let (levels_tx, levels_rx) = oneshot::channel();

    let send_result = state
        .deposit_channel
        .send(DepositRequest::ListLevels {
            response: levels_tx,
        })
        .await;
    if let Err(e) = send_result {
        return channel_error(e);
    }

    match levels_rx.await {
        Ok(Ok(levels)) => (StatusCode::OK, Json(json!(levels))),
        Ok(Err(service_error)) => error_response(service_error),
        Err(e) => channel_error(e),
    }
}

async fn list_bank_accounts(State(state): State<AppState>) -> impl IntoResponse {
    let (accounts_tx, accounts_rx) = oneshot::channel();

    let send_result = state
        .deposit_channel
        .send(DepositRequest::ListBankAccounts {
            response: accounts_tx,
        })
        .await;
    if let Err(e) = send_result {
        return channel_error(e);
    }

    match accounts_rx.await {
        Ok(Ok(accounts)) => (StatusCode::OK, Json(json!(accounts))),
        Ok(Err(service_error)) => error_response(service_error),
        Err(e) => channel_error(e),
    }
}

async fn request_withdrawal(
    State(state): State<AppState>,
    Json(req): Json<NewWithdrawal>,
) -> impl IntoResponse {
    let (withdrawal_tx, withdrawal_rx) = oneshot::channel();

    let send_result = state
        .withdrawal_channel
        .send(WithdrawalRequest::Request {
            new_withdrawal: req,
            response: withdrawal_tx,
        })
        .await;
    if let Err(e) = send_result {
        return channel_error(e);
    }

    match withdrawal_rx.await {
        Ok(Ok(withdrawal)) => (StatusCode::CREATED, Json(json!(withdrawal))),
        Ok(Err(service_error)) => error_response(service_error),
        Err(e) => channel_error(e),
    }
}

async fn approve_withdrawal(
    State(state): State<AppState>,
    Path(withdrawal_id): Path<String>,
) -> impl IntoResponse {
    let (withdrawal_tx, withdrawal_rx) = oneshot::channel();

    let send_result = state
        .withdrawal_channel
        .send(WithdrawalRequest::Approve {
            withdrawal_id,
            response: withdrawal_tx,
        })
        .await;
    if let Err(e) = send_result {
        return channel_error(e);
    }

    match withdrawal_rx.await {
        Ok(Ok(withdrawal)) => (StatusCode::OK, Json(json!(withdrawal))),
        Ok(Err(service_error)) => error_response(service_error),
        Err(e) => channel_error(e),
    }
}

async fn reject_withdrawal(
    State(state): State<AppState>,
    Path(withdrawal_id): Path<String>,
) -> impl IntoResponse {
    let (withdrawal_tx, withdrawal_rx) = oneshot::channel();

    let send_result = state
        .withdrawal_channel
        .send(WithdrawalRequest::Reject {
            withdrawal_id,
            response: withdrawal_tx,
        })
        .await;
    if let Err(e) = send_result {
        return channel_error(e);
    }

    match withdrawal_rx.await {
        Ok(Ok(withdrawal)) => (StatusCode::OK, Json(json!(withdrawal))),
        Ok(Err(service_error)) => error_response(service_error),
        Err(e) => channel_error(e),
    }
}

async fn claim_daily_earning(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let (earning_tx, earning_rx) = oneshot::channel();

    let send_result = state
        .earning_channel
        .send(EarningRequest::Claim {
            user_id,
            response: earning_tx,
        })
        .await;
    if let Err(e) = send_result {
        return channel_error(e);
    }

    match earning_rx.await {
        Ok(Ok(earning)) => (StatusCode::CREATED, Json(json!(earning))),
        Ok(Err(service_error)) => error_response(service_error),
        Err(e) => channel_error(e),
    }
}

pub async fn start_http_server(
    user_channel: mpsc::Sender<UserRequest>,
    deposit_channel: mpsc::Sender<DepositRequest>,
    withdrawal_channel: mpsc::Sender<WithdrawalRequest>,
    earning_channel: mpsc::Sender<EarningRequest>,
) -> Result<(), anyhow::Error> {
    let app_state = AppState {
        user_channel,
        deposit_channel,
        withdrawal_channel,
        earning_channel,
    };

    let app = Router::new()
        .route("/register", post(users::register))
        .route("/users/{id}/balance", get(users::get_balance))
        .route("/users/{id}/bank-details", put(users::update_bank_details))
        .route("/users/{id}/team", get(users::get_team))
        .route("/users/{id}/daily-earning", post(claim_daily_earning))
        .route("/levels", get(list_levels))
        .route("/bank-accounts", get(list_bank_accounts))
        .route("/deposits", post(submit_deposit))
        .route("/deposits/{id}/approve", post(approve_deposit))
        .route("/deposits/{id}/reject", post(reject_deposit))
        .route("/withdrawals", post(request_withdrawal))
        .route("/withdrawals/{id}/approve", post(approve_withdrawal))
        .route("/withdrawals/{id}/reject", post(reject_withdrawal))
        .route("/health", get(|| async { "OK" }))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    println!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_reasons_map_to_client_errors() {
        let (status, _) = error_response(ServiceError::Validation(LedgerError::InvalidTransition));
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) =
            error_response(ServiceError::Validation(LedgerError::InsufficientBalance));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = error_response(ServiceError::Validation(LedgerError::NotFound("deposit")));
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_faults_stay_generic() {
        let (status, body) = error_response(ServiceError::Internal("missing ledger account".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.0["error"], "Internal server error.");
    }
}
