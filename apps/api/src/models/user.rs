use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Authorisation facts about a user, read from the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserAccess {
    pub id: Uuid,
    pub permissions: Vec<String>,
    pub subscription_status: Option<String>,
    pub subscription_period_end: Option<DateTime<Utc>>,
}

impl UserAccess {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Active or trialing, and the paid period has not ended.
    pub fn has_valid_subscription(&self, now: DateTime<Utc>) -> bool {
        let status_ok = matches!(
            self.subscription_status.as_deref(),
            Some("active") | Some("trialing")
        );
        let period_ok = self.subscription_period_end.is_some_and(|end| end > now);
        status_ok && period_ok
    }
}
