//! Download strategies.
//!
//! A [`DownloadStrategy`] gets one candidate URL and an output directory and
//! either produces a file or fails. Two implementations exist:
//! [`ExternalDownloader`](external::ExternalDownloader) (yt-dlp subprocess)
//! and [`DirectDownloader`](direct::DirectDownloader) (streamed HTTP GET).
//! Failures are never retried here; the orchestrator decides what comes next.

pub mod direct;
pub mod external;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;

pub use direct::DirectDownloader;
pub use external::ExternalDownloader;

/// One attempt at fetching `url` into `output_dir`.
#[derive(Debug, Clone, Copy)]
pub struct DownloadRequest<'a> {
    pub url: &'a str,
    pub output_dir: &'a Path,
    /// Ask the strategy for extra diagnostics (yt-dlp `--verbose`).
    pub verbose: bool,
}

impl<'a> DownloadRequest<'a> {
    pub fn new(url: &'a str, output_dir: &'a Path) -> Self {
        Self {
            url,
            output_dir,
            verbose: false,
        }
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// A successful download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    /// Name of the strategy that produced the file.
    pub strategy: &'static str,
    /// URL that was downloaded.
    pub url: String,
    /// Where the file landed, when the strategy can tell.
    pub path: Option<PathBuf>,
}

/// Snapshot of a streamed download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Total bytes written so far.
    pub bytes_downloaded: u64,
    /// `Content-Length`, if the server sent one.
    pub total_bytes: Option<u64>,
}

impl DownloadProgress {
    /// Completed share in `0.0..=1.0`, if the total is known and non-zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> Option<f64> {
        match self.total_bytes {
            Some(total) if total > 0 => Some(self.bytes_downloaded as f64 / total as f64),
            _ => None,
        }
    }
}

/// Callback invoked after each written chunk.
pub type ProgressCallback = Box<dyn Fn(DownloadProgress) + Send + Sync>;

/// A mechanism that turns a URL into a file on disk.
#[async_trait]
pub trait DownloadStrategy: Send + Sync {
    /// Short name for logs (e.g. `"yt-dlp"`, `"direct"`).
    fn name(&self) -> &'static str;

    /// Download the request's URL into its output directory.
    ///
    /// The output directory is created if missing.
    async fn download(&self, request: &DownloadRequest<'_>) -> Result<DownloadResult>;
}

/// Create `dir` (and parents) if absent. Safe to call repeatedly.
pub(crate) async fn ensure_output_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    Ok(())
}
