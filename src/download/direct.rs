//! Plain streamed HTTP download for raw media files.
//!
//! Used after yt-dlp gives up on a URL that is obviously a file
//! (`.mp4`, `.webm`, `.mov`). The body is written through an 8 KiB buffer
//! under the URL's basename.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};
use url::Url;

use super::{
    ensure_output_dir, DownloadProgress, DownloadRequest, DownloadResult, DownloadStrategy,
    ProgressCallback,
};
use crate::error::{Result, VidgrabError};
use crate::fingerprint::download_profile;

/// Default connect timeout and per-read timeout for a direct download.
///
/// There is no overall deadline; a body that keeps arriving is never cut off.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Write buffer size.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Filename used when the URL path has no usable basename.
pub const FALLBACK_FILENAME: &str = "video.mp4";

/// Streamed HTTP GET strategy.
pub struct DirectDownloader {
    client: Client,
    progress: Option<ProgressCallback>,
}

impl DirectDownloader {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DOWNLOAD_TIMEOUT)
    }

    /// `timeout` bounds connecting and each socket read, not the whole body.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .default_headers(download_profile().to_headers())
            // Raw bytes only, so Content-Length matches what gets written
            .no_gzip()
            .no_brotli()
            .no_zstd()
            .no_deflate()
            .use_rustls_tls()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .tcp_nodelay(true)
            .build()?;

        Ok(Self {
            client,
            progress: None,
        })
    }

    /// Report progress after every chunk.
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Stream `url` into `path`. The file is only created once the server
    /// has answered with a success status, and removed again if streaming
    /// fails after that.
    async fn fetch_to(&self, url: &str, path: &Path) -> Result<u64> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| VidgrabError::direct(url, e))?;

        let file = tokio::fs::File::create(path)
            .await
            .map_err(|e| VidgrabError::direct(url, e))?;

        match self.write_body(url, response, file).await {
            Ok(bytes) => Ok(bytes),
            Err(err) => {
                if tokio::fs::remove_file(path).await.is_ok() {
                    warn!("Removed partial file {}", path.display());
                }
                Err(err)
            }
        }
    }

    async fn write_body(
        &self,
        url: &str,
        response: reqwest::Response,
        file: tokio::fs::File,
    ) -> Result<u64> {
        let total_bytes = response.content_length();
        debug!(?total_bytes, "Streaming body");

        let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
        let mut stream = response.bytes_stream();
        let mut bytes_downloaded = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| VidgrabError::direct(url, e))?;
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| VidgrabError::direct(url, e))?;
            bytes_downloaded += chunk.len() as u64;

            if let Some(ref cb) = self.progress {
                cb(DownloadProgress {
                    bytes_downloaded,
                    total_bytes,
                });
            }
        }

        writer.flush().await.map_err(|e| VidgrabError::direct(url, e))?;
        Ok(bytes_downloaded)
    }
}

#[async_trait]
impl DownloadStrategy for DirectDownloader {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn download(&self, request: &DownloadRequest<'_>) -> Result<DownloadResult> {
        ensure_output_dir(request.output_dir).await?;

        let path = request.output_dir.join(filename_for(request.url));
        info!("Direct download to: {}", path.display());

        let bytes = self.fetch_to(request.url, &path).await?;
        info!(bytes, "Saved {}", path.display());

        Ok(DownloadResult {
            strategy: self.name(),
            url: request.url.to_string(),
            path: Some(path),
        })
    }
}

/// Basename of the URL path, or [`FALLBACK_FILENAME`] when the path has no
/// file name with an extension.
#[must_use]
pub fn filename_for(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|name| name.contains('.'))
        .unwrap_or_else(|| FALLBACK_FILENAME.to_string())
}
