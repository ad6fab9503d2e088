//! Format choice and the yt-dlp options each choice maps to

use std::path::Path;

/// Output file name inside a work directory; titles are capped at 100 chars.
pub const OUTPUT_TEMPLATE: &str = "%(title).100s.%(ext)s";

const CONCURRENT_FRAGMENTS: &str = "5";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MediaKind {
    #[default]
    Video,
    Audio,
}

impl MediaKind {
    /// Parse a form value. Anything other than "audio" means video.
    pub fn from_form(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("audio") {
            MediaKind::Audio
        } else {
            MediaKind::Video
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Video => "Video (mp4)",
            MediaKind::Audio => "Audio (mp3)",
        }
    }

    fn format_selector(&self) -> &'static str {
        match self {
            MediaKind::Video => "best[ext=mp4]/best",
            MediaKind::Audio => "bestaudio/best",
        }
    }

    /// Build the yt-dlp argument list (without the URL) for this kind,
    /// writing into `workdir`.
    pub fn yt_dlp_args(&self, workdir: &Path) -> Vec<String> {
        let output = workdir.join(OUTPUT_TEMPLATE);

        let mut args = vec![
            "-f".to_string(),
            self.format_selector().to_string(),
            "-o".to_string(),
            output.to_string_lossy().into_owned(),
            "--no-playlist".to_string(),
            "--quiet".to_string(),
            "--no-progress".to_string(),
            "--concurrent-fragments".to_string(),
            CONCURRENT_FRAGMENTS.to_string(),
        ];

        if *self == MediaKind::Audio {
            args.extend(
                ["--extract-audio", "--audio-format", "mp3", "--audio-quality", "128K"]
                    .map(String::from),
            );
        }

        args
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_form() {
        assert_eq!(MediaKind::from_form("audio"), MediaKind::Audio);
        assert_eq!(MediaKind::from_form(" Audio "), MediaKind::Audio);
        assert_eq!(MediaKind::from_form("video"), MediaKind::Video);
        assert_eq!(MediaKind::from_form("flac"), MediaKind::Video);
        assert_eq!(MediaKind::from_form(""), MediaKind::Video);
    }

    #[test]
    fn test_video_args() {
        let args = MediaKind::Video.yt_dlp_args(Path::new("/tmp/work"));
        assert_eq!(&args[..2], ["-f", "best[ext=mp4]/best"]);
        assert!(args.contains(&"/tmp/work/%(title).100s.%(ext)s".to_string()));
        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(!args.contains(&"--extract-audio".to_string()));
    }

    #[test]
    fn test_audio_args() {
        let args = MediaKind::Audio.yt_dlp_args(Path::new("/tmp/work"));
        assert_eq!(&args[..2], ["-f", "bestaudio/best"]);
        let tail = &args[args.len() - 5..];
        assert_eq!(
            tail,
            ["--extract-audio", "--audio-format", "mp3", "--audio-quality", "128K"]
        );
    }
}
