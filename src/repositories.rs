pub mod deposits;
pub mod earnings;
pub mod ledger;
pub mod levels;
pub mod users;
pub mod withdrawals;
