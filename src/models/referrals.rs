use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inviter -> invitee edge with the one-time subsidy eligibility flag.
#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Referral {
    pub id: String,
    pub inviter_id: String,
    pub invitee_id: String,
    pub subsidy_granted: bool,
    pub created_at: DateTime<Utc>,
}

impl Referral {
    /// The grant fires at most once per edge, and only on an approval that
    /// activated a level for the invitee.
    pub fn subsidy_due(&self, activated_level: bool) -> bool {
        activated_level && !self.subsidy_granted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn edge(subsidy_granted: bool) -> Referral {
        Referral {
            id: "r-1".to_string(),
            inviter_id: "u-a".to_string(),
            invitee_id: "u-b".to_string(),
            subsidy_granted,
            created_at: Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_due_on_first_activation() {
        assert!(edge(false).subsidy_due(true));
    }

    #[test]
    fn test_not_due_without_activation() {
        assert!(!edge(false).subsidy_due(false));
    }

    #[test]
    fn test_never_due_twice() {
        assert!(!edge(true).subsidy_due(true));
        assert!(!edge(true).subsidy_due(false));
    }
}
