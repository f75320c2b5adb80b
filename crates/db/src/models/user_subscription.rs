use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// Lifecycle state of a subscription record.
///
/// Only `trialing` and `active` grant access. Any other string written by the
/// billing side (`canceled`, `expired`, ...) is preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionStatus {
    Trialing,
    Active,
    Other(String),
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Trialing => "trialing",
            Self::Active => "active",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for SubscriptionStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "trialing" => Self::Trialing,
            "active" => Self::Active,
            _ => Self::Other(s),
        }
    }
}

impl From<SubscriptionStatus> for String {
    fn from(status: SubscriptionStatus) -> Self {
        match status {
            SubscriptionStatus::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row per user in `user_subscriptions`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UserSubscription {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(try_from = "String")]
    #[ts(type = "string")]
    pub status: SubscriptionStatus,
    pub trial_end: Option<DateTime<Utc>>,
    pub plan_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for a freshly provisioned trial.
#[derive(Debug, Clone)]
pub struct CreateTrialSubscription {
    pub user_id: Uuid,
    pub trial_end: DateTime<Utc>,
    pub plan_name: String,
    pub created_at: DateTime<Utc>,
}

impl UserSubscription {
    pub async fn find_by_user_id(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, UserSubscription>(
            r#"SELECT id, user_id, status, trial_end, plan_name, created_at, updated_at
               FROM user_subscriptions
               WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Plain insert. Fails with a unique violation if the user already has a
    /// record; callers decide whether that is an error.
    pub async fn create_trial(
        pool: &SqlitePool,
        data: &CreateTrialSubscription,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, UserSubscription>(
            r#"INSERT INTO user_subscriptions
                   (id, user_id, status, trial_end, plan_name, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $6)
               RETURNING id, user_id, status, trial_end, plan_name, created_at, updated_at"#,
        )
        .bind(id)
        .bind(data.user_id)
        .bind(SubscriptionStatus::Trialing.as_str())
        .bind(data.trial_end)
        .bind(&data.plan_name)
        .bind(data.created_at)
        .fetch_one(pool)
        .await
    }
}
