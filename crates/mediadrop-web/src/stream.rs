//! Sending a finished file to the browser as a download

use axum::{
    body::Body,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use std::io;
use std::path::Path;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// Stream `path` as an attachment named after the file.
///
/// The file is opened before returning, so a later unlink of the path does
/// not interrupt the transfer on Unix.
pub async fn attachment(path: &Path) -> io::Result<Response> {
    let file = File::open(path).await?;
    let size = file.metadata().await?.len();

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "download".to_string());

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let content_type = HeaderValue::from_str(mime.as_ref())
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&content_disposition(&name))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let body = Body::from_stream(ReaderStream::new(file));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, HeaderValue::from(size)),
        ],
        body,
    )
        .into_response())
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name.
pub fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_name() {
        assert_eq!(
            content_disposition("Big Buck Bunny.mp4"),
            "attachment; filename=\"Big Buck Bunny.mp4\"; filename*=UTF-8''Big%20Buck%20Bunny.mp4"
        );
    }

    #[test]
    fn test_non_ascii_and_quotes() {
        let value = content_disposition("Café \"live\".mp3");
        assert!(value.starts_with("attachment; filename=\"Caf_ _live_.mp3\";"));
        assert!(value.ends_with("filename*=UTF-8''Caf%C3%A9%20%22live%22.mp3"));
    }

    #[tokio::test]
    async fn test_attachment_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, vec![7u8; 2048]).unwrap();

        let response = attachment(&path).await.unwrap();
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "video/mp4");
        assert_eq!(headers[header::CONTENT_LENGTH], "2048");
        assert!(headers[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("filename=\"clip.mp4\""));
    }

    #[tokio::test]
    async fn test_attachment_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(attachment(&dir.path().join("nope.mp4")).await.is_err());
    }
}
