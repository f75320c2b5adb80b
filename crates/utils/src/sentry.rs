use sentry::ClientInitGuard;

/// Start the Sentry client when `SENTRY_DSN` is configured.
///
/// The returned guard must stay alive for the lifetime of the process so
/// queued events are flushed on shutdown.
pub fn init_once(dsn: Option<&str>) -> Option<ClientInitGuard> {
    let dsn = dsn.filter(|d| !d.trim().is_empty())?;
    let environment = if cfg!(debug_assertions) {
        "dev"
    } else {
        "production"
    };

    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some(environment.into()),
            ..Default::default()
        },
    )))
}

