use async_trait::async_trait;
use rust_decimal::Decimal;

use super::{RequestHandler, Service};

/// Fire-and-forget events emitted after a ledger transaction commits.
/// Senders ignore delivery failures; nothing here can roll a commit back.
pub enum NotificationEvent {
    DepositApproved { user_id: String, amount: Decimal },
    SubsidyGranted {
        inviter_id: String,
        invitee_id: String,
        amount: Decimal,
    },
    EarningClaimed { user_id: String, amount: Decimal },
}

#[derive(Clone)]
pub struct NotificationHandler;

impl NotificationHandler {
    pub fn new() -> Self {
        NotificationHandler {}
    }
}

#[async_trait]
impl RequestHandler<NotificationEvent> for NotificationHandler {
    async fn handle_request(&self, event: NotificationEvent) {
        match event {
            NotificationEvent::DepositApproved { user_id, amount } => {
                log::info!("Deposit approved for {}: {}", user_id, amount);
            }
            NotificationEvent::SubsidyGranted {
                inviter_id,
                invitee_id,
                amount,
            } => {
                log::info!(
                    "Subsidy of {} granted to {} for inviting {}",
                    amount,
                    inviter_id,
                    invitee_id
                );
            }
            NotificationEvent::EarningClaimed { user_id, amount } => {
                log::info!("Daily earning of {} claimed by {}", amount, user_id);
            }
        }
    }
}

pub struct NotificationService;

impl NotificationService {
    pub fn new() -> Self {
        NotificationService {}
    }
}

#[async_trait]
impl Service<NotificationEvent, NotificationHandler> for NotificationService {}
