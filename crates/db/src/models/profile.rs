use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// Per-user profile flags and login bookkeeping.
///
/// `onboarding_completed` and `quiz_completed` only ever move from false to
/// true; none of the queries below can reset them.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub login_count: i64,
    pub quiz_completed: bool,
    pub onboarding_completed: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub async fn find_by_user_id(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Profile>(
            r#"SELECT id, user_id, login_count, quiz_completed, onboarding_completed,
                      last_login_at, created_at, updated_at
               FROM profiles
               WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Record a login in one statement: create the row on first login,
    /// otherwise bump the counter and fold `quiz_completed` into
    /// `onboarding_completed` for profiles that predate onboarding.
    pub async fn upsert_login(
        pool: &SqlitePool,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Profile>(
            r#"INSERT INTO profiles
                   (id, user_id, login_count, quiz_completed, onboarding_completed,
                    last_login_at, created_at, updated_at)
               VALUES ($1, $2, 1, 0, 0, $3, $3, $3)
               ON CONFLICT(user_id) DO UPDATE SET
                   login_count = profiles.login_count + 1,
                   last_login_at = excluded.last_login_at,
                   onboarding_completed = (profiles.onboarding_completed OR profiles.quiz_completed),
                   updated_at = excluded.updated_at
               RETURNING id, user_id, login_count, quiz_completed, onboarding_completed,
                         last_login_at, created_at, updated_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    /// Update-only variant of [`Profile::upsert_login`]. Returns `None` when
    /// the user has no profile row yet.
    pub async fn record_login(
        pool: &SqlitePool,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Profile>(
            r#"UPDATE profiles
               SET login_count = login_count + 1,
                   last_login_at = $2,
                   onboarding_completed = (onboarding_completed OR quiz_completed),
                   updated_at = $2
               WHERE user_id = $1
               RETURNING id, user_id, login_count, quiz_completed, onboarding_completed,
                         last_login_at, created_at, updated_at"#,
        )
        .bind(user_id)
        .bind(now)
        .fetch_optional(pool)
        .await
    }

    pub async fn mark_onboarding_completed(
        pool: &SqlitePool,
        user_id: Uuid,
        quiz_completed: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Profile>(
            r#"UPDATE profiles
               SET onboarding_completed = 1,
                   quiz_completed = (quiz_completed OR $2),
                   updated_at = $3
               WHERE user_id = $1
               RETURNING id, user_id, login_count, quiz_completed, onboarding_completed,
                         last_login_at, created_at, updated_at"#,
        )
        .bind(user_id)
        .bind(quiz_completed)
        .bind(now)
        .fetch_optional(pool)
        .await
    }

    /// Legacy rows were written before onboarding existed and may carry
    /// `quiz_completed = 1` with `onboarding_completed = 0`.
    pub async fn insert_legacy(
        pool: &SqlitePool,
        user_id: Uuid,
        login_count: i64,
        quiz_completed: bool,
        onboarding_completed: bool,
        now: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Profile>(
            r#"INSERT INTO profiles
                   (id, user_id, login_count, quiz_completed, onboarding_completed,
                    last_login_at, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, NULL, $6, $6)
               RETURNING id, user_id, login_count, quiz_completed, onboarding_completed,
                         last_login_at, created_at, updated_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(login_count)
        .bind(quiz_completed)
        .bind(onboarding_completed)
        .bind(now)
        .fetch_one(pool)
        .await
    }
}
