//! Error types shared by the fetcher, the download strategies and the
//! orchestrator.

use thiserror::Error;

/// Everything that can go wrong while locating or downloading a video.
///
/// Only [`VidgrabError::Fetch`] is terminal for a run; the others make the
/// orchestrator move on to the next strategy or candidate.
#[derive(Error, Debug)]
pub enum VidgrabError {
    /// Network or HTTP status failure while retrieving the page.
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The external downloader could not be started at all.
    #[error("could not launch {tool}: {source}")]
    ToolLaunch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The external downloader ran but exited unsuccessfully.
    #[error("{tool} exited with {status}")]
    ExternalTool { tool: String, status: String },

    /// Request or write failure during a streamed download.
    #[error("direct download of {url} failed: {reason}")]
    DirectDownload { url: String, reason: String },

    /// The HTTP client itself could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VidgrabError {
    pub(crate) fn direct(url: &str, reason: impl std::fmt::Display) -> Self {
        Self::DirectDownload {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VidgrabError>;
