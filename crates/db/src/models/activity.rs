use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Kind of daily practice that counts towards a streak
#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(type_name = "activity_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ActivityKind {
    Reading,
    Prayer,
    Devotional,
}

/// One completed activity on one civil day
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub activity_date: NaiveDate,
    pub kind: ActivityKind,
    pub created_at: DateTime<Utc>,
}

impl ActivityRecord {
    /// Insert unless the same kind was already recorded that day.
    /// Returns `None` when the row already existed.
    pub async fn record(
        pool: &SqlitePool,
        user_id: Uuid,
        activity_date: NaiveDate,
        kind: ActivityKind,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, ActivityRecord>(
            r#"INSERT INTO activity_log (id, user_id, activity_date, kind, created_at)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT(user_id, activity_date, kind) DO NOTHING
               RETURNING id, user_id, activity_date, kind, created_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(activity_date)
        .bind(kind)
        .bind(now)
        .fetch_optional(pool)
        .await
    }

    /// Distinct active days for a user, newest first.
    pub async fn find_dates(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<NaiveDate>, sqlx::Error> {
        sqlx::query_scalar::<_, NaiveDate>(
            r#"SELECT DISTINCT activity_date
               FROM activity_log
               WHERE user_id = $1
               ORDER BY activity_date DESC"#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
