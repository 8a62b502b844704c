use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::withdrawals::{NewWithdrawal, Withdrawal, WithdrawalPolicy};
use crate::repositories::withdrawals::WithdrawalRepository;

pub enum WithdrawalRequest {
    Request {
        new_withdrawal: NewWithdrawal,
        response: oneshot::Sender<Result<Withdrawal, ServiceError>>,
    },
    Approve {
        withdrawal_id: String,
        response: oneshot::Sender<Result<Withdrawal, ServiceError>>,
    },
    Reject {
        withdrawal_id: String,
        response: oneshot::Sender<Result<Withdrawal, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct WithdrawalRequestHandler {
    repository: WithdrawalRepository,
    policy: WithdrawalPolicy,
}

impl WithdrawalRequestHandler {
    pub fn new(sql_conn: PgPool, policy: WithdrawalPolicy) -> Self {
        WithdrawalRequestHandler {
            repository: WithdrawalRepository::new(sql_conn),
            policy,
        }
    }

    async fn request(&self, new_withdrawal: NewWithdrawal) -> Result<Withdrawal, ServiceError> {
        self.repository
            .request(&new_withdrawal, &self.policy)
            .await
            .map_err(|e| ServiceError::from_ledger("WithdrawalService", e))
    }

    async fn approve(&self, withdrawal_id: &str) -> Result<Withdrawal, ServiceError> {
        self.repository
            .approve(withdrawal_id)
            .await
            .map_err(|e| ServiceError::from_ledger("WithdrawalService", e))
    }

    async fn reject(&self, withdrawal_id: &str) -> Result<Withdrawal, ServiceError> {
        self.repository
            .reject(withdrawal_id)
            .await
            .map_err(|e| ServiceError::from_ledger("WithdrawalService", e))
    }
}

#[async_trait]
impl RequestHandler<WithdrawalRequest> for WithdrawalRequestHandler {
    async fn handle_request(&self, request: WithdrawalRequest) {
        match request {
            WithdrawalRequest::Request {
                new_withdrawal,
                response,
            } => {
                let withdrawal = self.request(new_withdrawal).await;
                let _ = response.send(withdrawal);
            }
            WithdrawalRequest::Approve {
                withdrawal_id,
                response,
            } => {
                let withdrawal = self.approve(&withdrawal_id).await;
                let _ = response.send(withdrawal);
            }
            WithdrawalRequest::Reject {
                withdrawal_id,
                response,
            } => {
                let withdrawal = self.reject(&withdrawal_id).await;
                let _ = response.send(withdrawal);
            }
        }
    }
}

pub struct WithdrawalService;

impl WithdrawalService {
    pub fn new() -> Self {
        WithdrawalService {}
    }
}

#[async_trait]
impl Service<WithdrawalRequest, WithdrawalRequestHandler> for WithdrawalService {}
