use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tokio::sync::{mpsc, oneshot};

use super::notifications::NotificationEvent;
use super::{RequestHandler, Service, ServiceError};
use crate::models::deposits::{BankAccount, Deposit, NewDeposit};
use crate::models::levels::Level;
use crate::repositories::deposits::DepositRepository;
use crate::repositories::levels::LevelRepository;

pub enum DepositRequest {
    Submit {
        new_deposit: NewDeposit,
        response: oneshot::Sender<Result<Deposit, ServiceError>>,
    },
    Approve {
        deposit_id: String,
        response: oneshot::Sender<Result<Deposit, ServiceError>>,
    },
    Reject {
        deposit_id: String,
        response: oneshot::Sender<Result<Deposit, ServiceError>>,
    },
    ListLevels {
        response: oneshot::Sender<Result<Vec<Level>, ServiceError>>,
    },
    ListBankAccounts {
        response: oneshot::Sender<Result<Vec<BankAccount>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct DepositRequestHandler {
    deposits: DepositRepository,
    levels: LevelRepository,
    subsidy_amount: Decimal,
    notification_channel: mpsc::Sender<NotificationEvent>,
}

impl DepositRequestHandler {
    pub fn new(
        sql_conn: PgPool,
        subsidy_amount: Decimal,
        notification_channel: mpsc::Sender<NotificationEvent>,
    ) -> Self {
        DepositRequestHandler {
            deposits: DepositRepository::new(sql_conn.clone()),
            levels: LevelRepository::new(sql_conn),
            subsidy_amount,
            notification_channel,
        }
    }

    async fn submit(&self, new_deposit: NewDeposit) -> Result<Deposit, ServiceError> {
        self.deposits
            .submit(&new_deposit)
            .await
            .map_err(|e| ServiceError::from_ledger("DepositService", e))
    }

    async fn approve(&self, deposit_id: &str) -> Result<Deposit, ServiceError> {
        let approval = self
            .deposits
            .approve(deposit_id, self.subsidy_amount)
            .await
            .map_err(|e| ServiceError::from_ledger("DepositService", e))?;

        if let Some(level_id) = approval.activated_level {
            log::info!(
                "Level {} activated for {}",
                level_id,
                approval.deposit.user_id
            );
        }

        // The transaction is committed; notifications are best-effort.
        let _ = self
            .notification_channel
            .send(NotificationEvent::DepositApproved {
                user_id: approval.deposit.user_id.clone(),
                amount: approval.deposit.amount,
            })
            .await;
        if let Some(grant) = &approval.subsidy {
            let _ = self
                .notification_channel
                .send(NotificationEvent::SubsidyGranted {
                    inviter_id: grant.inviter_id.clone(),
                    invitee_id: grant.invitee_id.clone(),
                    amount: grant.amount,
                })
                .await;
        }

        Ok(approval.deposit)
    }

    async fn reject(&self, deposit_id: &str) -> Result<Deposit, ServiceError> {
        self.deposits
            .reject(deposit_id)
            .await
            .map_err(|e| ServiceError::from_ledger("DepositService", e))
    }

    async fn list_levels(&self) -> Result<Vec<Level>, ServiceError> {
        self.levels
            .list_active()
            .await
            .map_err(|e| ServiceError::from_ledger("DepositService", e))
    }

    async fn list_bank_accounts(&self) -> Result<Vec<BankAccount>, ServiceError> {
        self.deposits
            .list_bank_accounts()
            .await
            .map_err(|e| ServiceError::from_ledger("DepositService", e))
    }
}

#[async_trait]
impl RequestHandler<DepositRequest> for DepositRequestHandler {
    async fn handle_request(&self, request: DepositRequest) {
        match request {
            DepositRequest::Submit {
                new_deposit,
                response,
            } => {
                let deposit = self.submit(new_deposit).await;
                let _ = response.send(deposit);
            }
            DepositRequest::Approve {
                deposit_id,
                response,
            } => {
                let deposit = self.approve(&deposit_id).await;
                let _ = response.send(deposit);
            }
            DepositRequest::Reject {
                deposit_id,
                response,
            } => {
                let deposit = self.reject(&deposit_id).await;
                let _ = response.send(deposit);
            }
            DepositRequest::ListLevels { response } => {
                let levels = self.list_levels().await;
                let _ = response.send(levels);
            }
            DepositRequest::ListBankAccounts { response } => {
                let accounts = self.list_bank_accounts().await;
                let _ = response.send(accounts);
            }
        }
    }
}

pub struct DepositService;

impl DepositService {
    pub fn new() -> Self {
        DepositService {}
    }
}

#[async_trait]
impl Service<DepositRequest, DepositRequestHandler> for DepositService {}
