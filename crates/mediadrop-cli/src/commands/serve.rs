use anyhow::{Context, Result};
use std::path::Path;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::args::ServeOptions;
use mediadrop_core::{config::Config, workdir::sweep_stale};
use mediadrop_web::{serve, AppState};

pub async fn run(options: &ServeOptions, config_path: Option<&Path>) -> Result<()> {
    let mut config = Config::load(config_path)?;

    if let Some(ref host) = options.host {
        config.server.host = host.clone();
    }
    if let Some(port) = options.port {
        config.server.port = port;
    }

    tokio::fs::create_dir_all(config.temp_dir())
        .await
        .with_context(|| format!("creating {}", config.temp_dir().display()))?;

    // timers from a previous run are gone; their directories are not
    if let Err(e) = sweep_stale(config.temp_dir(), config.stale_after()).await {
        warn!("Could not sweep {}: {}", config.temp_dir().display(), e);
    }

    let state = AppState::from_config(&config)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {}", addr))?;

    info!(
        "Work directory: {} (max {} concurrent downloads)",
        config.temp_dir().display(),
        config.server.max_concurrent_downloads
    );

    serve(listener, state, shutdown_signal())
        .await
        .context("running HTTP server")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down");
}
