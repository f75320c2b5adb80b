//! Premium access decisions.
//!
//! [`evaluate_access`] is the whole policy: a pure function of the stored
//! subscription record and the current time. [`AccessService`] only adds
//! fetching and a short-lived record cache around it, and resolves every
//! fetch failure to "no record", i.e. no access.

use std::time::Duration;

use chrono::{DateTime, Utc};
use db::models::user_subscription::{SubscriptionStatus, UserSubscription};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::warn;
use ts_rs::TS;
use uuid::Uuid;

use super::trial::TRIAL_PLAN_NAME;

/// Plan label shown for paid subscriptions that carry no name of their own.
pub const DEFAULT_PAID_PLAN_NAME: &str = "Premium";

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
const CACHE_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct AccessDecision {
    pub is_active: bool,
    pub is_in_trial: bool,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub days_remaining: i64,
    pub plan_name: Option<String>,
}

impl AccessDecision {
    pub fn no_access() -> Self {
        Self {
            is_active: false,
            is_in_trial: false,
            trial_ends_at: None,
            days_remaining: 0,
            plan_name: None,
        }
    }
}

/// Decide access from a subscription record.
///
/// A missing record never implies trial eligibility: accounts that predate
/// subscription records get no access until a record is created for them.
pub fn evaluate_access(record: Option<&UserSubscription>, now: DateTime<Utc>) -> AccessDecision {
    let Some(record) = record else {
        return AccessDecision::no_access();
    };

    match &record.status {
        SubscriptionStatus::Trialing => match record.trial_end {
            None => AccessDecision::no_access(),
            Some(trial_end) if now >= trial_end => AccessDecision {
                trial_ends_at: Some(trial_end),
                ..AccessDecision::no_access()
            },
            Some(trial_end) => AccessDecision {
                is_active: true,
                is_in_trial: true,
                trial_ends_at: Some(trial_end),
                days_remaining: days_until(now, trial_end),
                plan_name: Some(TRIAL_PLAN_NAME.to_string()),
            },
        },
        SubscriptionStatus::Active => AccessDecision {
            is_active: true,
            is_in_trial: false,
            trial_ends_at: None,
            days_remaining: 0,
            plan_name: Some(
                record
                    .plan_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_PAID_PLAN_NAME.to_string()),
            ),
        },
        SubscriptionStatus::Other(_) => AccessDecision {
            trial_ends_at: record.trial_end,
            ..AccessDecision::no_access()
        },
    }
}

/// Whole days left, rounded up, never negative.
fn days_until(now: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let remaining_ms = (end - now).num_milliseconds();
    if remaining_ms <= 0 {
        return 0;
    }
    (remaining_ms + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

/// Access checks for request handlers.
///
/// Caches fetched records per user for a short TTL and evaluates them
/// against the current time on every call, so a cached entry can never keep
/// an expired trial alive. Lookups that find no record or fail are not
/// cached: a record can appear at any moment (first login, `/init-trial`)
/// and a lookup started before that insert must not hide it.
#[derive(Clone)]
pub struct AccessService {
    pool: SqlitePool,
    records: Cache<Uuid, UserSubscription>,
}

#[derive(Debug, Error)]
enum LoadError {
    #[error("no subscription record")]
    NotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl AccessService {
    pub fn new(pool: SqlitePool, ttl: Duration) -> Self {
        let records = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(ttl)
            .build();
        Self { pool, records }
    }

    pub async fn check(&self, user_id: Uuid, now: DateTime<Utc>) -> AccessDecision {
        let record = self.load(user_id).await;
        evaluate_access(record.as_ref(), now)
    }

    /// Drop any cached record and check again against the store.
    pub async fn revalidate(&self, user_id: Uuid, now: DateTime<Utc>) -> AccessDecision {
        self.invalidate(user_id).await;
        self.check(user_id, now).await
    }

    pub async fn invalidate(&self, user_id: Uuid) {
        self.records.invalidate(&user_id).await;
    }

    async fn load(&self, user_id: Uuid) -> Option<UserSubscription> {
        let pool = self.pool.clone();
        let fetched = self
            .records
            .try_get_with(user_id, async move {
                UserSubscription::find_by_user_id(&pool, user_id)
                    .await?
                    .ok_or(LoadError::NotFound)
            })
            .await;

        match fetched {
            Ok(record) => Some(record),
            Err(e) => {
                if let LoadError::Database(db_err) = e.as_ref() {
                    warn!(
                        user_id = %user_id,
                        error = %db_err,
                        "Subscription lookup failed, denying access"
                    );
                }
                None
            }
        }
    }
}
