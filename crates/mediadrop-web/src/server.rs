//! Shared state, router and server loop

use axum::{
    routing::{get, post},
    Router,
};
use mediadrop_core::{Config, Extractor, Result, YtDlp};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::flash::FlashStore;
use crate::routes;

#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<dyn Extractor>,
    pub temp_dir: PathBuf,
    pub success_delay: Duration,
    pub failure_delay: Duration,
    pub permits: Arc<Semaphore>,
    pub flashes: FlashStore,
}

impl AppState {
    /// State backed by the yt-dlp binary described in `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let extractor = YtDlp::new(config.yt_dlp_path()?, config.download_timeout())
            .with_ffmpeg(config.paths.ffmpeg.clone())
            .with_extra_args(config.download.extra_args.clone());

        Ok(Self::new(Arc::new(extractor), config))
    }

    pub fn new(extractor: Arc<dyn Extractor>, config: &Config) -> Self {
        Self {
            extractor,
            temp_dir: config.temp_dir().to_path_buf(),
            success_delay: config.success_delay(),
            failure_delay: config.failure_delay(),
            permits: Arc::new(Semaphore::new(config.server.max_concurrent_downloads)),
            flashes: FlashStore::new(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/download", post(routes::download))
        .route("/healthz", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
