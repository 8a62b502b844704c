use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::{mpsc, oneshot};

use super::notifications::NotificationEvent;
use super::{RequestHandler, Service, ServiceError};
use crate::models::earnings::{local_today, DailyEarning};
use crate::repositories::earnings::EarningsRepository;

pub enum EarningRequest {
    Claim {
        user_id: String,
        response: oneshot::Sender<Result<DailyEarning, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct EarningsRequestHandler {
    repository: EarningsRepository,
    utc_offset_hours: i32,
    notification_channel: mpsc::Sender<NotificationEvent>,
}

impl EarningsRequestHandler {
    pub fn new(
        sql_conn: PgPool,
        utc_offset_hours: i32,
        notification_channel: mpsc::Sender<NotificationEvent>,
    ) -> Self {
        EarningsRequestHandler {
            repository: EarningsRepository::new(sql_conn),
            utc_offset_hours,
            notification_channel,
        }
    }

    async fn claim(&self, user_id: &str) -> Result<DailyEarning, ServiceError> {
        let today = local_today(Utc::now(), self.utc_offset_hours);
        let earning = self
            .repository
            .claim(user_id, today)
            .await
            .map_err(|e| ServiceError::from_ledger("EarningsService", e))?;

        let _ = self
            .notification_channel
            .send(NotificationEvent::EarningClaimed {
                user_id: earning.user_id.clone(),
                amount: earning.amount,
            })
            .await;

        Ok(earning)
    }
}

#[async_trait]
impl RequestHandler<EarningRequest> for EarningsRequestHandler {
    async fn handle_request(&self, request: EarningRequest) {
        match request {
            EarningRequest::Claim { user_id, response } => {
                let earning = self.claim(&user_id).await;
                let _ = response.send(earning);
            }
        }
    }
}

pub struct EarningsService;

impl EarningsService {
    pub fn new() -> Self {
        EarningsService {}
    }
}

#[async_trait]
impl Service<EarningRequest, EarningsRequestHandler> for EarningsService {}
