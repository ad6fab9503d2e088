//! Error types for mediadrop-core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MediaDropError>;

#[derive(Error, Debug)]
pub enum MediaDropError {
    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("yt-dlp not found. Install it from https://github.com/yt-dlp/yt-dlp")]
    YtDlpNotFound,

    #[error("{message}")]
    Failed { code: Option<i32>, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Video unavailable or private: {0}")]
    VideoUnavailable(String),

    #[error("yt-dlp did not finish within {0} seconds")]
    TimedOut(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(String),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
