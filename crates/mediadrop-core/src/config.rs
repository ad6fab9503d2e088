//! Configuration management for mediadrop

use crate::error::ConfigError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub paths: PathsConfig,
    pub download: DownloadConfig,
    pub temp: TempConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to
    pub host: String,
    /// Port to listen on (the bare `PORT` variable is honoured too)
    pub port: u16,
    /// Extractions allowed to run at the same time
    pub max_concurrent_downloads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Path to yt-dlp binary (auto-detected if not set)
    pub yt_dlp: Option<PathBuf>,
    /// Path to FFmpeg binary, passed to yt-dlp when set
    pub ffmpeg: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Upper bound for a single yt-dlp run
    pub timeout_secs: u64,
    /// Extra arguments appended to every yt-dlp invocation (e.g. `--cookies`)
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TempConfig {
    /// Base directory holding one work directory per request
    pub directory: PathBuf,
    /// Delay before a served download is deleted
    pub success_delay_secs: u64,
    /// Delay before a failed download's leftovers are deleted
    pub failure_delay_secs: u64,
    /// Leftovers older than this are swept on startup
    pub stale_after_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                max_concurrent_downloads: 4,
            },
            paths: PathsConfig {
                yt_dlp: None,
                ffmpeg: None,
            },
            download: DownloadConfig {
                timeout_secs: 600,
                extra_args: Vec::new(),
            },
            temp: TempConfig {
                directory: PathBuf::from("./downloads_temp"),
                success_delay_secs: 30,
                failure_delay_secs: 5,
                stale_after_secs: 3600,
            },
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Config::default()));

        // Load from default config directory
        if let Some(config_dir) = dirs::config_dir() {
            let default_config = config_dir.join("mediadrop/config.toml");
            if default_config.exists() {
                figment = figment.merge(Toml::file(&default_config));
            }
        }

        // Load from specified config file
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }

        // Hosting platforms hand out the port through a bare PORT variable
        figment = figment.merge(Env::raw().only(&["PORT"]).map(|_| "server.port".into()));

        // Load from environment
        figment = figment.merge(Env::prefixed("MEDIADROP_").split("__"));

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::LoadError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.max_concurrent_downloads == 0 {
            return Err(ConfigError::InvalidValue(
                "server.max_concurrent_downloads must be at least 1".to_string(),
            ));
        }
        if self.download.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "download.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Get yt-dlp path, auto-detecting if not configured
    pub fn yt_dlp_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.paths.yt_dlp {
            Ok(path.clone())
        } else {
            which::which("yt-dlp")
                .map_err(|_| ConfigError::InvalidValue("yt-dlp not found in PATH".to_string()))
        }
    }

    /// Get FFmpeg path, auto-detecting if not configured
    pub fn ffmpeg_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.paths.ffmpeg {
            Ok(path.clone())
        } else {
            which::which("ffmpeg")
                .map_err(|_| ConfigError::InvalidValue("ffmpeg not found in PATH".to_string()))
        }
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp.directory
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download.timeout_secs)
    }

    pub fn success_delay(&self) -> Duration {
        Duration::from_secs(self.temp.success_delay_secs)
    }

    pub fn failure_delay(&self) -> Duration {
        Duration::from_secs(self.temp.failure_delay_secs)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.temp.stale_after_secs)
    }
}
