use std::sync::Arc;

use anyhow::{Context, Result};

use eventlens::{AppState, app};
use eventlens_core::EventLensConfig;
use eventlens_core::config::expand_path;
use eventlens_supabase::SupabaseClient;

pub async fn run(config_path: Option<&str>, bind: Option<String>) -> Result<()> {
    let mut config = match config_path {
        Some(path) => EventLensConfig::load_from(&expand_path(path))?,
        None => EventLensConfig::load()?,
    };
    if let Some(bind) = bind {
        config.server.bind = bind;
    }

    config.validate().context(
        "Incomplete configuration.\n\
        Set backend.url and backend.anon_key in the config file \
        (see `eventlens config path`) or via EVENTLENS__BACKEND__URL / EVENTLENS__BACKEND__ANON_KEY",
    )?;

    let backend = SupabaseClient::new(&config.backend)?;
    let state = AppState::new(&config, Arc::new(backend));

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        bucket = %config.backend.bucket,
        "eventlens listening"
    );

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("eventlens stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "could not listen for shutdown signal");
    }
}
