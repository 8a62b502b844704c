use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::ledger::{BankDetails, LedgerAccount};
use crate::models::users::{NewUser, TeamMember, User};
use crate::repositories::ledger::LedgerRepository;
use crate::repositories::users::UserRepository;

pub enum UserRequest {
    Register {
        new_user: NewUser,
        response: oneshot::Sender<Result<User, ServiceError>>,
    },
    GetAccount {
        user_id: String,
        response: oneshot::Sender<Result<LedgerAccount, ServiceError>>,
    },
    UpdateBankDetails {
        user_id: String,
        details: BankDetails,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
    GetTeam {
        user_id: String,
        response: oneshot::Sender<Result<Vec<TeamMember>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct UserRequestHandler {
    users: UserRepository,
    ledger: LedgerRepository,
}

impl UserRequestHandler {
    pub fn new(sql_conn: PgPool) -> Self {
        UserRequestHandler {
            users: UserRepository::new(sql_conn.clone()),
            ledger: LedgerRepository::new(sql_conn),
        }
    }

    async fn register(&self, new_user: NewUser) -> Result<User, ServiceError> {
        self.users
            .insert_user(
                &new_user.phone_number,
                new_user.name.as_deref(),
                new_user.referral_code.as_deref(),
            )
            .await
            .map_err(|e| ServiceError::from_ledger("UserService", e))
    }

    async fn get_account(&self, user_id: &str) -> Result<LedgerAccount, ServiceError> {
        self.ledger
            .get_account(user_id)
            .await
            .map_err(|e| ServiceError::from_ledger("UserService", e))
    }

    async fn update_bank_details(
        &self,
        user_id: &str,
        details: &BankDetails,
    ) -> Result<(), ServiceError> {
        self.ledger
            .update_bank_details(user_id, details)
            .await
            .map_err(|e| ServiceError::from_ledger("UserService", e))
    }

    async fn get_team(&self, user_id: &str) -> Result<Vec<TeamMember>, ServiceError> {
        self.users
            .get_team(user_id)
            .await
            .map_err(|e| ServiceError::from_ledger("UserService", e))
    }
}

#[async_trait]
impl RequestHandler<UserRequest> for UserRequestHandler {
    async fn handle_request(&self, request: UserRequest) {
        match request {
            UserRequest::Register { new_user, response } => {
                let user = self.register(new_user).await;
                let _ = response.send(user);
            }
            UserRequest::GetAccount { user_id, response } => {
                let account = self.get_account(&user_id).await;
                let _ = response.send(account);
            }
            UserRequest::UpdateBankDetails {
                user_id,
                details,
                response,
            } => {
                let result = self.update_bank_details(&user_id, &details).await;
                let _ = response.send(result);
            }
            UserRequest::GetTeam { user_id, response } => {
                let team = self.get_team(&user_id).await;
                let _ = response.send(team);
            }
        }
    }
}

pub struct UserService;

impl UserService {
    pub fn new() -> Self {
        UserService {}
    }
}

#[async_trait]
impl Service<UserRequest, UserRequestHandler> for UserService {}
