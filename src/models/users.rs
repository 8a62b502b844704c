use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub phone_number: String,
    pub name: Option<String>,
    pub referral_code: String,
    pub referred_by: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewUser {
    pub phone_number: String,
    pub name: Option<String>,
    pub referral_code: Option<String>,
}

/// One row per direct invitee, for the team screen.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct TeamMember {
    pub phone_number: String,
    pub name: Option<String>,
    pub invited_at: chrono::DateTime<chrono::Utc>,
    pub active_level: Option<String>,
    pub subsidy_granted: bool,
}

pub fn generate_referral_code() -> String {
    Uuid::new_v4().simple().to_string()[..10].to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referral_code_shape() {
        let code = generate_referral_code();
        assert_eq!(code.len(), 10);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_referral_codes_differ() {
        assert_ne!(generate_referral_code(), generate_referral_code());
    }
}
