use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::json;
use tokio::sync::oneshot;

use super::{channel_error, error_response, AppState};
use crate::models::ledger::BankDetails;
use crate::models::users::NewUser;
use crate::services::users::UserRequest;

#[derive(Serialize)]
struct RegisterResponse {
    user_id: String,
    phone_number: String,
    referral_code: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<NewUser>,
) -> impl IntoResponse {
    let (user_tx, user_rx) = oneshot::channel();

    let send_result = state
        .user_channel
        .send(UserRequest::Register {
            new_user: req,
            response: user_tx,
        })
        .await;
    if let Err(e) = send_result {
        return channel_error(e);
    }

    match user_rx.await {
        Ok(Ok(user)) => {
            let response = RegisterResponse {
                user_id: user.id,
                phone_number: user.phone_number,
                referral_code: user.referral_code,
            };
            (StatusCode::CREATED, Json(json!(response)))
        }
        Ok(Err(service_error)) => error_response(service_error),
        Err(e) => channel_error(e),
    }
}

pub async fn get_balance(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let (account_tx, account_rx) = oneshot::channel();

    let send_result = state
        .user_channel
        .send(UserRequest::GetAccount {
            user_id,
            response: account_tx,
        })
        .await;
    if let Err(e) = send_result {
        return channel_error(e);
    }

    match account_rx.await {
        Ok(Ok(account)) => (StatusCode::OK, Json(json!(account))),
        Ok(Err(service_error)) => error_response(service_error),
        Err(e) => channel_error(e),
    }
}

pub async fn update_bank_details(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(details): Json<BankDetails>,
) -> impl IntoResponse {
    let (update_tx, update_rx) = oneshot::channel();

    let send_result = state
        .user_channel
        .send(UserRequest::UpdateBankDetails {
            user_id,
            details,
            response: update_tx,
        })
        .await;
    if let Err(e) = send_result {
        return channel_error(e);
    }

    match update_rx.await {
        Ok(Ok(())) => (StatusCode::OK, Json(json!({ "updated": true }))),
        Ok(Err(service_error)) => error_response(service_error),
        Err(e) => channel_error(e),
    }
}

pub async fn get_team(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let (team_tx, team_rx) = oneshot::channel();

    let send_result = state
        .user_channel
        .send(UserRequest::GetTeam {
            user_id,
            response: team_tx,
        })
        .await;
    if let Err(e) = send_result {
        return channel_error(e);
    }

    match team_rx.await {
        Ok(Ok(team)) => (StatusCode::OK, Json(json!(team))),
        Ok(Err(service_error)) => error_response(service_error),
        Err(e) => channel_error(e),
    }
}
