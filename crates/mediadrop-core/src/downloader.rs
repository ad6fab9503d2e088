//! Media download via yt-dlp

use crate::error::DownloadError;
use crate::format::MediaKind;
use async_trait::async_trait;
use regex::Regex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// Something that can fetch a URL into a work directory.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn fetch(&self, url: &str, kind: MediaKind, workdir: &Path) -> Result<(), DownloadError>;
}

#[derive(Debug, Clone)]
pub struct YtDlp {
    yt_dlp_path: PathBuf,
    ffmpeg_path: Option<PathBuf>,
    extra_args: Vec<String>,
    timeout: Duration,
}

impl YtDlp {
    pub fn new(yt_dlp_path: PathBuf, timeout: Duration) -> Self {
        Self {
            yt_dlp_path,
            ffmpeg_path: None,
            extra_args: Vec::new(),
            timeout,
        }
    }

    pub fn with_ffmpeg(mut self, ffmpeg_path: Option<PathBuf>) -> Self {
        self.ffmpeg_path = ffmpeg_path;
        self
    }

    pub fn with_extra_args(mut self, extra_args: Vec<String>) -> Self {
        self.extra_args = extra_args;
        self
    }

    fn command(&self, url: &str, kind: MediaKind, workdir: &Path) -> Command {
        let mut cmd = Command::new(&self.yt_dlp_path);
        cmd.args(kind.yt_dlp_args(workdir));

        if let Some(ref ffmpeg) = self.ffmpeg_path {
            cmd.arg("--ffmpeg-location").arg(ffmpeg);
        }

        cmd.args(&self.extra_args);
        // end of options, so a URL can never be read as a flag
        cmd.arg("--").arg(url);

        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Extractor for YtDlp {
    async fn fetch(&self, url: &str, kind: MediaKind, workdir: &Path) -> Result<(), DownloadError> {
        info!("Downloading {} from: {}", kind, url);

        let child = self.command(url, kind, workdir).spawn().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                DownloadError::YtDlpNotFound
            } else {
                DownloadError::Io(e)
            }
        })?;

        // Dropping the future on timeout kills the child
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| DownloadError::TimedOut(self.timeout.as_secs()))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr: {}", stderr);
            return Err(classify_failure(url, output.status.code(), &stderr));
        }

        debug!("yt-dlp finished for {}", url);
        Ok(())
    }
}

/// Map a failed yt-dlp run to an error from what it printed on stderr.
pub fn classify_failure(url: &str, code: Option<i32>, stderr: &str) -> DownloadError {
    if stderr.contains("Video unavailable") || stderr.contains("Private video") {
        return DownloadError::VideoUnavailable(url.to_string());
    }
    if stderr.contains("is not a valid URL") || stderr.contains("Unsupported URL") {
        return DownloadError::InvalidUrl(url.to_string());
    }

    let message = error_line(stderr).unwrap_or_else(|| match code {
        Some(code) => format!("yt-dlp failed with exit code {}", code),
        None => "yt-dlp was terminated by a signal".to_string(),
    });

    DownloadError::Failed { code, message }
}

/// The last `ERROR:` line, with the `[extractor] id:` prefix removed.
/// Falls back to the last non-empty line.
fn error_line(stderr: &str) -> Option<String> {
    static ERROR_LINE: OnceLock<Regex> = OnceLock::new();
    let re = ERROR_LINE.get_or_init(|| {
        Regex::new(r"^ERROR:\s*(?:\[[^\]]+\]\s*(?:[^\s:]+:\s*)?)?(.+)$").expect("static regex")
    });

    let lines: Vec<&str> = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    lines
        .iter()
        .rev()
        .find_map(|line| re.captures(line).map(|c| c[1].trim().to_string()))
        .or_else(|| lines.last().map(|l| l.to_string()))
}

/// A URL is accepted when it is non-empty and uses http or https.
pub fn validate_url(url: &str) -> bool {
    let url = url.trim();
    url.starts_with("http://") || url.starts_with("https://")
}
