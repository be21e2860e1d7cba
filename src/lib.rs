//! `vidgrab` - find the video behind a web page and download it
//!
//! # Pipeline
//!
//! - **Classification**: URLs that already point at a media file or a known
//!   video host skip page scraping entirely
//! - **yt-dlp first**: the page URL itself is handed to yt-dlp
//! - **Extraction**: `<video>`/`<source>`/`<iframe>` elements, then a regex
//!   rule table for Wistia, Vimeo, `YouTube` and raw `.mp4/.m3u8/.webm` links
//! - **Fallback chain**: each candidate goes to yt-dlp, raw files also get a
//!   streamed HTTP download; the first success ends the run
//! - **Manual instructions** when nothing works
//!
//! # Example
//!
//! ```rust,no_run
//! use vidgrab::{Config, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!     let orchestrator = Orchestrator::from_config(&config, None)?;
//!     let report = orchestrator.run("https://example.com/launch").await;
//!     println!("success: {}", report.is_success());
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod config;
pub mod download;
pub mod error;
pub mod extract;
pub mod fingerprint;
pub mod http_client;
pub mod manual;
pub mod orchestrator;

pub use classify::is_direct_video_url;
pub use config::Config;
pub use download::{
    DirectDownloader, DownloadProgress, DownloadRequest, DownloadResult, DownloadStrategy,
    ExternalDownloader, ProgressCallback,
};
pub use error::{Result, VidgrabError};
pub use extract::{Candidate, CandidateList, Extractor, SourceKind};
pub use http_client::{PageClient, PageSource};
pub use manual::manual_instructions;
pub use orchestrator::{FailureReason, Orchestrator, Outcome, RunReport, RunSettings};

/// Version of vidgrab
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
