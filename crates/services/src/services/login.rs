//! Login callback orchestration.
//!
//! Runs once per successful sign-in:
//! `Authenticating -> ProfileSync -> TrialCheck -> RedirectDecision -> Done`.
//! Each stage completes before the next starts. Only `Authenticating` and
//! `ProfileSync` can fail the login; trial provisioning is best effort.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use db::{DBService, models::profile::Profile};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use ts_rs::TS;
use uuid::Uuid;

use super::{
    access::AccessService,
    auth::{AuthError, AuthProvider, AuthenticatedUser},
    trial::{TrialOutcome, TrialService},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStage {
    Authenticating,
    ProfileSync,
    TrialCheck,
    RedirectDecision,
    Done,
}

/// Where the client should navigate after the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
pub enum RedirectTarget {
    #[serde(rename = "/home")]
    Home,
    #[serde(rename = "/onboarding")]
    Onboarding,
}

impl RedirectTarget {
    pub fn for_profile(profile: &Profile) -> Self {
        if profile.onboarding_completed {
            Self::Home
        } else {
            Self::Onboarding
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::Home => "/home",
            Self::Onboarding => "/onboarding",
        }
    }
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(AuthError),
    #[error("auth backend misconfigured: {0}")]
    AuthMisconfigured(AuthError),
    #[error("auth backend unavailable: {0}")]
    AuthUnavailable(AuthError),
    #[error("profile sync failed (upsert: {upsert}; update fallback: {fallback})")]
    ProfileSync {
        upsert: String,
        fallback: sqlx::Error,
    },
}

impl From<AuthError> for LoginError {
    fn from(e: AuthError) -> Self {
        match e {
            e if e.is_unauthenticated() => Self::Unauthenticated(e),
            AuthError::Misconfigured(_) => Self::AuthMisconfigured(e),
            e => Self::AuthUnavailable(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: AuthenticatedUser,
    pub profile: Profile,
    pub redirect: RedirectTarget,
    /// `None` when provisioning failed; the failure has been logged.
    pub trial: Option<TrialOutcome>,
}

#[derive(Clone)]
pub struct LoginOrchestrator {
    db: DBService,
    auth: Arc<dyn AuthProvider>,
    access: AccessService,
    profile_sync_timeout: Duration,
}

impl LoginOrchestrator {
    pub fn new(
        db: DBService,
        auth: Arc<dyn AuthProvider>,
        access: AccessService,
        profile_sync_timeout: Duration,
    ) -> Self {
        Self {
            db,
            auth,
            access,
            profile_sync_timeout,
        }
    }

    pub async fn handle_login(
        &self,
        bearer_token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<LoginOutcome, LoginError> {
        debug!(stage = ?LoginStage::Authenticating, "Login callback");
        let token = bearer_token.ok_or(LoginError::Unauthenticated(AuthError::MissingToken))?;
        let user = self.auth.verify(token).await.map_err(|e| {
            let err = LoginError::from(e);
            warn!(error = %err, "Login callback authentication failed");
            err
        })?;

        debug!(stage = ?LoginStage::ProfileSync, user_id = %user.user_id, "Login callback");
        let profile =
            sync_profile(&self.db.pool, user.user_id, now, self.profile_sync_timeout).await?;

        debug!(stage = ?LoginStage::TrialCheck, user_id = %user.user_id, "Login callback");
        let trial = match TrialService::ensure_trial(&self.db.pool, user.user_id, now).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                // Forwarded to Sentry by the tracing layer. The user is let in;
                // without a record every access check denies premium features.
                error!(
                    user_id = %user.user_id,
                    error = %e,
                    "Trial provisioning failed during login"
                );
                None
            }
        };
        self.access.invalidate(user.user_id).await;

        debug!(stage = ?LoginStage::RedirectDecision, user_id = %user.user_id, "Login callback");
        let redirect = RedirectTarget::for_profile(&profile);

        info!(
            stage = ?LoginStage::Done,
            user_id = %user.user_id,
            login_count = profile.login_count,
            redirect = redirect.path(),
            trial_created = trial.as_ref().is_some_and(TrialOutcome::was_created),
            "Login callback complete"
        );

        Ok(LoginOutcome {
            user,
            profile,
            redirect,
            trial,
        })
    }
}

/// Record the login on the profile row.
///
/// The atomic upsert gets `primary_timeout`; if it errors or times out, a
/// plain update of an existing row is attempted. Only when both fail is the
/// error returned.
pub async fn sync_profile(
    pool: &SqlitePool,
    user_id: Uuid,
    now: DateTime<Utc>,
    primary_timeout: Duration,
) -> Result<Profile, LoginError> {
    let upsert_failure = match timeout(primary_timeout, Profile::upsert_login(pool, user_id, now))
        .await
    {
        Ok(Ok(profile)) => return Ok(profile),
        Ok(Err(e)) => e.to_string(),
        Err(_) => format!("timed out after {}ms", primary_timeout.as_millis()),
    };

    warn!(
        user_id = %user_id,
        upsert_error = %upsert_failure,
        "Profile upsert failed, falling back to update"
    );

    match Profile::record_login(pool, user_id, now).await {
        Ok(Some(profile)) => Ok(profile),
        Ok(None) => Err(LoginError::ProfileSync {
            upsert: upsert_failure,
            fallback: sqlx::Error::RowNotFound,
        }),
        Err(fallback) => Err(LoginError::ProfileSync {
            upsert: upsert_failure,
            fallback,
        }),
    }
}
