//! Request handlers

use axum::{
    extract::{Form, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use mediadrop_core::{downloader::validate_url, MediaKind, WorkDir};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::flash;
use crate::page::render_index;
use crate::server::AppState;
use crate::stream::attachment;

pub const INVALID_URL: &str = "Please enter a valid URL";
pub const FILE_NOT_FOUND: &str = "Download completed but file not found.";

#[derive(Debug, Deserialize)]
pub struct DownloadForm {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub kind: Option<String>,
}

/// GET / — the form, plus any pending flash message.
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(id) = flash::cookie_id(&headers) else {
        return Html(render_index(None)).into_response();
    };

    let message = state.flashes.take(&id);
    (
        [(header::SET_COOKIE, flash::clear_cookie())],
        Html(render_index(message.as_deref())),
    )
        .into_response()
}

/// POST /download — fetch the media and hand it back as an attachment.
pub async fn download(State(state): State<AppState>, Form(form): Form<DownloadForm>) -> Response {
    let url = form.url.trim();
    if !validate_url(url) {
        return flash_redirect(&state, INVALID_URL);
    }
    let kind = form
        .kind
        .as_deref()
        .map(MediaKind::from_form)
        .unwrap_or_default();

    // a dropped handler (client gone mid-download) still removes the directory
    let workdir = match WorkDir::create(&state.temp_dir).await {
        Ok(dir) => dir.with_drop_delay(state.failure_delay),
        Err(e) => {
            error!("Failed to create work directory: {}", e);
            return flash_redirect(&state, format!("Error: {}", e));
        }
    };

    let fetched = {
        // the semaphore is never closed
        let _permit = state.permits.acquire().await.ok();
        state.extractor.fetch(url, kind, workdir.path()).await
    };

    if let Err(e) = fetched {
        warn!("Download of {} failed: {}", url, e);
        workdir.cleanup_after(state.failure_delay);
        return flash_redirect(&state, format!("Error: {}", e));
    }

    let file = match workdir.largest_file().await {
        Ok(Some(file)) => file,
        Ok(None) => {
            warn!("yt-dlp produced no file for {}", url);
            workdir.cleanup_after(state.failure_delay);
            return flash_redirect(&state, FILE_NOT_FOUND);
        }
        Err(e) => {
            error!("Failed to list {}: {}", workdir.path().display(), e);
            workdir.cleanup_after(state.failure_delay);
            return flash_redirect(&state, format!("Error: {}", e));
        }
    };

    match attachment(&file).await {
        Ok(response) => {
            info!("Serving {}", file.display());
            workdir.cleanup_after(state.success_delay);
            response
        }
        Err(e) => {
            error!("Failed to open {}: {}", file.display(), e);
            workdir.cleanup_after(state.failure_delay);
            flash_redirect(&state, format!("Error: {}", e))
        }
    }
}

/// GET /healthz
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn flash_redirect(state: &AppState, message: impl Into<String>) -> Response {
    let id = state.flashes.push(message);
    (
        [(header::SET_COOKIE, flash::set_cookie(&id))],
        Redirect::to("/"),
    )
        .into_response()
}
