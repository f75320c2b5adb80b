//! Process configuration loaded once at startup.

use std::time::Duration;

use chrono::FixedOffset;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_DATABASE_URL: &str = "sqlite://devotional.db";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
/// UTC-03:00, the civil calendar every streak is computed in.
const DEFAULT_CALENDAR_OFFSET_MINUTES: i32 = -180;
const DEFAULT_PROFILE_SYNC_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_ACCESS_CACHE_TTL_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug)]
pub struct Config {
    pub supabase_url: Url,
    pub supabase_anon_key: SecretString,
    pub supabase_service_role_key: SecretString,
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub calendar_offset: FixedOffset,
    pub profile_sync_timeout: Duration,
    pub access_cache_ttl: Duration,
    pub sentry_dsn: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let supabase_url = {
            let raw = require("SUPABASE_URL")?;
            Url::parse(&raw).map_err(|e| ConfigError::Invalid {
                key: "SUPABASE_URL",
                reason: e.to_string(),
            })?
        };
        let supabase_anon_key = SecretString::from(require("SUPABASE_ANON_KEY")?);
        let supabase_service_role_key = SecretString::from(require("SUPABASE_SERVICE_ROLE_KEY")?);

        let offset_minutes: i32 = parse_or(
            "CALENDAR_UTC_OFFSET_MINUTES",
            get("CALENDAR_UTC_OFFSET_MINUTES"),
            DEFAULT_CALENDAR_OFFSET_MINUTES,
        )?;
        let calendar_offset =
            offset_minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .ok_or_else(|| ConfigError::Invalid {
                    key: "CALENDAR_UTC_OFFSET_MINUTES",
                    reason: format!("{offset_minutes} minutes is outside +/-24h"),
                })?;

        Ok(Self {
            supabase_url,
            supabase_anon_key,
            supabase_service_role_key,
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?,
            calendar_offset,
            profile_sync_timeout: Duration::from_millis(parse_or(
                "PROFILE_SYNC_TIMEOUT_MS",
                get("PROFILE_SYNC_TIMEOUT_MS"),
                DEFAULT_PROFILE_SYNC_TIMEOUT_MS,
            )?),
            access_cache_ttl: Duration::from_secs(parse_or(
                "ACCESS_CACHE_TTL_SECS",
                get("ACCESS_CACHE_TTL_SECS"),
                DEFAULT_ACCESS_CACHE_TTL_SECS,
            )?),
            sentry_dsn: get("SENTRY_DSN"),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("SUPABASE_URL", "https://project.supabase.co"),
        ("SUPABASE_ANON_KEY", "anon"),
        ("SUPABASE_SERVICE_ROLE_KEY", "service"),
    ];

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup(REQUIRED)).unwrap();

        assert_eq!(config.supabase_url.as_str(), "https://project.supabase.co/");
        assert_eq!(config.supabase_anon_key.expose_secret(), "anon");
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.calendar_offset.local_minus_utc(), -3 * 3600);
        assert_eq!(config.profile_sync_timeout, Duration::from_secs(5));
        assert_eq!(config.access_cache_ttl, Duration::from_secs(30));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_each_credential_is_required() {
        for missing in ["SUPABASE_URL", "SUPABASE_ANON_KEY", "SUPABASE_SERVICE_ROLE_KEY"] {
            let pairs: Vec<_> = REQUIRED
                .iter()
                .copied()
                .filter(|(k, _)| *k != missing)
                .collect();
            let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
            assert!(matches!(err, ConfigError::Missing(key) if key == missing));
        }
    }

    #[test]
    fn test_blank_credential_counts_as_missing() {
        let mut pairs = REQUIRED.to_vec();
        pairs[1] = ("SUPABASE_ANON_KEY", "   ");
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SUPABASE_ANON_KEY")));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "not-a-port"));
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)).unwrap_err(),
            ConfigError::Invalid { key: "PORT", .. }
        ));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("CALENDAR_UTC_OFFSET_MINUTES", "5000"));
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)).unwrap_err(),
            ConfigError::Invalid {
                key: "CALENDAR_UTC_OFFSET_MINUTES",
                ..
            }
        ));

        let mut pairs = REQUIRED.to_vec();
        pairs[0] = ("SUPABASE_URL", "not a url");
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)).unwrap_err(),
            ConfigError::Invalid {
                key: "SUPABASE_URL",
                ..
            }
        ));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("CALENDAR_UTC_OFFSET_MINUTES", "60"),
            ("PROFILE_SYNC_TIMEOUT_MS", "250"),
            ("SENTRY_DSN", "https://key@sentry.example/1"),
        ]);
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.calendar_offset.local_minus_utc(), 3600);
        assert_eq!(config.profile_sync_timeout, Duration::from_millis(250));
        assert!(config.sentry_dsn.is_some());
    }
}
