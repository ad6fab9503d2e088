//! mediadrop-core: yt-dlp invocation and work directory lifecycle for mediadrop

pub mod config;
pub mod downloader;
pub mod error;
pub mod format;
pub mod workdir;

pub use config::Config;
pub use downloader::{Extractor, YtDlp};
pub use error::{DownloadError, MediaDropError, Result};
pub use format::MediaKind;
pub use workdir::WorkDir;
