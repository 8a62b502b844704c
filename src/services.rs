use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::mpsc;

use crate::models::withdrawals::WithdrawalPolicy;
use crate::models::LedgerError;
use crate::settings::Settings;

mod deposits;
mod earnings;
mod http;
mod notifications;
mod users;
mod withdrawals;

#[derive(Debug, thiserror::Error)]
enum ServiceError {
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Repository error: {0} - {1}")]
    Repository(String, String),
    #[error("{0}")]
    Validation(LedgerError),
}

impl ServiceError {
    /// Validation outcomes go back to the caller verbatim; database and
    /// provisioning faults are logged here and surfaced as generic failures.
    fn from_ledger(service: &str, e: LedgerError) -> Self {
        match e {
            LedgerError::Database(err) => {
                log::error!("{}: database failure: {}", service, err);
                ServiceError::Repository(service.to_string(), err.to_string())
            }
            LedgerError::NotFound("ledger account") => {
                log::error!("{}: missing ledger account for an existing user", service);
                ServiceError::Internal("missing ledger account".to_string())
            }
            other => ServiceError::Validation(other),
        }
    }
}

#[async_trait]
pub trait RequestHandler<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    async fn handle_request(&self, request: T);
}

#[async_trait]
pub trait Service<T, H>: Send + Sync + 'static
where
    T: Send + 'static,
    H: RequestHandler<T> + Clone + Send,
{
    async fn run(&mut self, handler: H, receiver: &mut mpsc::Receiver<T>) {
        while let Some(request) = receiver.recv().await {
            let handler = handler.clone();

            tokio::spawn(async move {
                handler.handle_request(request).await;
            });
        }
    }
}

pub async fn start_services(pool: PgPool, settings: Settings) -> Result<(), anyhow::Error> {
    let (user_tx, mut user_rx) = mpsc::channel(512);
    let (deposit_tx, mut deposit_rx) = mpsc::channel(512);
    let (withdrawal_tx, mut withdrawal_rx) = mpsc::channel(512);
    let (earning_tx, mut earning_rx) = mpsc::channel(512);
    let (notification_tx, mut notification_rx) = mpsc::channel(512);

    let mut user_service = users::UserService::new();
    let mut deposit_service = deposits::DepositService::new();
    let mut withdrawal_service = withdrawals::WithdrawalService::new();
    let mut earning_service = earnings::EarningsService::new();
    let mut notification_service = notifications::NotificationService::new();

    println!("[*] Starting notification service.");
    tokio::spawn(async move {
        notification_service
            .run(notifications::NotificationHandler::new(), &mut notification_rx)
            .await;
    });

    println!("[*] Starting user service.");
    let user_pool = pool.clone();
    tokio::spawn(async move {
        user_service
            .run(users::UserRequestHandler::new(user_pool), &mut user_rx)
            .await;
    });

    println!("[*] Starting deposit service.");
    let deposit_pool = pool.clone();
    let deposit_notification_tx = notification_tx.clone();
    let subsidy_amount = settings.platform.subsidy_amount;
    tokio::spawn(async move {
        deposit_service
            .run(
                deposits::DepositRequestHandler::new(
                    deposit_pool,
                    subsidy_amount,
                    deposit_notification_tx,
                ),
                &mut deposit_rx,
            )
            .await;
    });

    println!("[*] Starting withdrawal service.");
    let withdrawal_pool = pool.clone();
    let policy = WithdrawalPolicy {
        minimum_amount: settings.withdrawal.minimum_amount,
        utc_offset_hours: settings.platform.utc_offset_hours,
        opens_at_hour: settings.withdrawal.opens_at_hour,
        closes_at_hour: settings.withdrawal.closes_at_hour,
    };
    tokio::spawn(async move {
        withdrawal_service
            .run(
                withdrawals::WithdrawalRequestHandler::new(withdrawal_pool, policy),
                &mut withdrawal_rx,
            )
            .await;
    });

    println!("[*] Starting earnings service.");
    let earning_pool = pool.clone();
    let earning_notification_tx = notification_tx.clone();
    let utc_offset_hours = settings.platform.utc_offset_hours;
    tokio::spawn(async move {
        earning_service
            .run(
                earnings::EarningsRequestHandler::new(
                    earning_pool,
                    utc_offset_hours,
                    earning_notification_tx,
                ),
                &mut earning_rx,
            )
            .await;
    });

    println!("[*] Starting HTTP server.");
    http::start_http_server(user_tx, deposit_tx, withdrawal_tx, earning_tx).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_keep_their_reason() {
        let mapped = ServiceError::from_ledger("TestService", LedgerError::InsufficientBalance);
        assert!(matches!(
            mapped,
            ServiceError::Validation(LedgerError::InsufficientBalance)
        ));
    }

    #[test]
    fn test_missing_ledger_account_becomes_generic() {
        let mapped =
            ServiceError::from_ledger("TestService", LedgerError::NotFound("ledger account"));
        assert!(matches!(mapped, ServiceError::Internal(_)));
    }

    #[test]
    fn test_database_errors_become_repository_errors() {
        let mapped = ServiceError::from_ledger(
            "TestService",
            LedgerError::Database(sqlx::Error::RowNotFound),
        );
        assert!(matches!(mapped, ServiceError::Repository(_, _)));
    }
}
