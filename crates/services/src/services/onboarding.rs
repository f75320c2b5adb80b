use chrono::{DateTime, Utc};
use db::models::profile::Profile;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum OnboardingError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("no profile for user {0}; the login callback has not run")]
    ProfileNotFound(Uuid),
}

pub struct OnboardingService;

impl OnboardingService {
    /// Mark onboarding finished. Flags only move forward, so calling this
    /// with `quiz_completed = false` after an earlier `true` keeps the quiz
    /// marked as done.
    pub async fn complete(
        pool: &SqlitePool,
        user_id: Uuid,
        quiz_completed: bool,
        now: DateTime<Utc>,
    ) -> Result<Profile, OnboardingError> {
        let profile = Profile::mark_onboarding_completed(pool, user_id, quiz_completed, now)
            .await?
            .ok_or(OnboardingError::ProfileNotFound(user_id))?;

        info!(
            user_id = %user_id,
            quiz_completed = profile.quiz_completed,
            "Onboarding completed"
        );
        Ok(profile)
    }
}
