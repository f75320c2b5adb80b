use std::sync::Arc;

use anyhow::Context;
use db::DBService;
use server::{AppState, routes};
use services::services::{auth::SupabaseAuthClient, config::Config};
use tracing::info;
use utils::{logging, sentry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("invalid configuration")?;
    let sentry_guard = sentry::init_once(config.sentry_dsn.as_deref());
    logging::init_tracing(sentry_guard.is_some());

    let db = DBService::connect(&config.database_url)
        .await
        .with_context(|| format!("failed to open database {}", config.database_url))?;
    let auth = SupabaseAuthClient::new(&config.supabase_url, &config.supabase_anon_key)
        .context("failed to build auth client")?;

    let state = AppState::new(db, Arc::new(auth), &config);
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;
    info!(
        addr = %listener.local_addr()?,
        calendar_offset = %config.calendar_offset,
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
