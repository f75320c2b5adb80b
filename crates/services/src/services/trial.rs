//! First-login trial provisioning.

use chrono::{DateTime, Duration, Utc};
use db::{
    is_unique_violation,
    models::user_subscription::{CreateTrialSubscription, UserSubscription},
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Display label for a free trial.
pub const TRIAL_PLAN_NAME: &str = "Trial Gratuito";
/// Trials are fixed-length and never extended.
pub const TRIAL_DURATION_HOURS: i64 = 72;

pub fn trial_duration() -> Duration {
    Duration::hours(TRIAL_DURATION_HOURS)
}

#[derive(Debug, Error)]
pub enum TrialError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("subscription for user {0} conflicted on insert but could not be read back")]
    ConflictWithoutRecord(Uuid),
}

#[derive(Debug, Clone)]
pub enum TrialOutcome {
    Created(UserSubscription),
    AlreadyExists(UserSubscription),
}

impl TrialOutcome {
    pub fn subscription(&self) -> &UserSubscription {
        match self {
            Self::Created(s) | Self::AlreadyExists(s) => s,
        }
    }

    pub fn into_subscription(self) -> UserSubscription {
        match self {
            Self::Created(s) | Self::AlreadyExists(s) => s,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

pub struct TrialService;

impl TrialService {
    /// Make sure `user_id` has exactly one subscription record.
    ///
    /// The caller must already have authenticated `user_id`. An existing
    /// record of any status is returned untouched; a trial is only granted
    /// when no record exists at all.
    pub async fn ensure_trial(
        pool: &SqlitePool,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<TrialOutcome, TrialError> {
        if let Some(existing) = UserSubscription::find_by_user_id(pool, user_id).await? {
            debug!(user_id = %user_id, status = %existing.status, "Subscription already exists");
            return Ok(TrialOutcome::AlreadyExists(existing));
        }

        Self::insert_trial(pool, user_id, now).await
    }

    /// Insert a trial; a concurrent insert that won the race on the
    /// `user_id` unique constraint counts as success.
    async fn insert_trial(
        pool: &SqlitePool,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<TrialOutcome, TrialError> {
        let data = CreateTrialSubscription {
            user_id,
            trial_end: now + trial_duration(),
            plan_name: TRIAL_PLAN_NAME.to_string(),
            created_at: now,
        };

        match UserSubscription::create_trial(pool, &data).await {
            Ok(created) => {
                info!(
                    user_id = %user_id,
                    trial_end = %data.trial_end,
                    "Trial subscription created"
                );
                Ok(TrialOutcome::Created(created))
            }
            Err(e) if is_unique_violation(&e) => {
                debug!(user_id = %user_id, "Lost trial insert race, reading existing record");
                UserSubscription::find_by_user_id(pool, user_id)
                    .await?
                    .map(TrialOutcome::AlreadyExists)
                    .ok_or(TrialError::ConflictWithoutRecord(user_id))
            }
            Err(e) => Err(e.into()),
        }
    }
}
