use chrono::{DateTime, Utc};
use db::models::activity::{ActivityKind, ActivityRecord};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use super::streak::{CivilCalendar, StreakSummary};

#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct ActivityService;

impl ActivityService {
    /// Record `kind` on the user's current civil day and return the
    /// refreshed summary. Recording the same kind twice a day is a no-op.
    pub async fn record(
        pool: &SqlitePool,
        calendar: &CivilCalendar,
        user_id: Uuid,
        kind: ActivityKind,
        now: DateTime<Utc>,
    ) -> Result<StreakSummary, ActivityError> {
        let today = calendar.today(now);
        match ActivityRecord::record(pool, user_id, today, kind, now).await? {
            Some(_) => info!(user_id = %user_id, kind = %kind, date = %today, "Activity recorded"),
            None => debug!(user_id = %user_id, kind = %kind, date = %today, "Activity already recorded today"),
        }

        Self::summary(pool, calendar, user_id, now).await
    }

    pub async fn summary(
        pool: &SqlitePool,
        calendar: &CivilCalendar,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<StreakSummary, ActivityError> {
        let dates = ActivityRecord::find_dates(pool, user_id).await?;
        Ok(StreakSummary::from_dates(&dates, calendar.today(now)))
    }
}
