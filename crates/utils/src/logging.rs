use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const WORKSPACE_CRATES: &[&str] = &["server", "services", "db", "utils"];

/// Default filter when `RUST_LOG` is unset: `info` globally, `debug` for our
/// own crates.
pub fn default_filter() -> EnvFilter {
    let directives = WORKSPACE_CRATES
        .iter()
        .map(|c| format!("{c}=debug"))
        .collect::<Vec<_>>()
        .join(",");
    EnvFilter::new(format!("info,{directives}"))
}

/// Install the global subscriber. `error!` events are forwarded to Sentry
/// when `with_sentry` is set; the caller is responsible for having started
/// the Sentry client.
pub fn init_tracing(with_sentry: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());
    let sentry_layer = with_sentry.then(sentry_tracing::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(sentry_layer)
        .init();
}
