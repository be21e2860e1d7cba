//! yt-dlp bridge.
//!
//! Hands a URL to yt-dlp, which knows how to pull video out of most hosting
//! platforms and many ordinary pages. Success is the exit status and nothing
//! else; stdout is only mined for the destination path.
//!
//! There is no timeout: a hung yt-dlp blocks the run.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::{ensure_output_dir, DownloadRequest, DownloadResult, DownloadStrategy};
use crate::error::{Result, VidgrabError};

/// Output template relative to the output directory.
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// yt-dlp subprocess strategy.
#[derive(Debug, Clone)]
pub struct ExternalDownloader {
    /// Path to the yt-dlp binary
    binary: String,
    /// Additional arguments placed before the URL
    extra_args: Vec<String>,
}

impl ExternalDownloader {
    /// Locate `yt-dlp` in PATH, falling back to the bare name.
    #[must_use]
    pub fn new() -> Self {
        let binary = which::which("yt-dlp")
            .map_or_else(|_| "yt-dlp".to_string(), |p| p.to_string_lossy().to_string());

        Self {
            binary,
            extra_args: Vec::new(),
        }
    }

    /// Use a specific binary (resolved through PATH when it is a bare name).
    #[must_use]
    pub fn with_binary_path(mut self, path: &str) -> Self {
        self.binary = which::which(path)
            .map_or_else(|_| path.to_string(), |p| p.to_string_lossy().to_string());
        self
    }

    #[must_use]
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    #[must_use]
    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn build_args(&self, url: &str, output_dir: &Path, verbose: bool) -> Vec<String> {
        let mut args = vec![
            "--no-check-certificate".to_string(),
            "--no-playlist".to_string(),
            "-o".to_string(),
            output_dir.join(OUTPUT_TEMPLATE).to_string_lossy().to_string(),
        ];

        if verbose {
            args.push("--verbose".to_string());
        }

        args.extend(self.extra_args.iter().cloned());
        args.push(url.to_string());

        args
    }
}

impl Default for ExternalDownloader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DownloadStrategy for ExternalDownloader {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn download(&self, request: &DownloadRequest<'_>) -> Result<DownloadResult> {
        ensure_output_dir(request.output_dir).await?;

        let args = self.build_args(request.url, request.output_dir, request.verbose);
        debug!("yt-dlp args: {:?}", args);

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| VidgrabError::ToolLaunch {
                tool: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            for line in stderr.lines().rev().take(3) {
                debug!("yt-dlp: {}", line);
            }
            return Err(VidgrabError::ExternalTool {
                tool: self.binary.clone(),
                status: output.status.to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let report = OutputReport::parse(&stdout);
        for line in &report.lines {
            info!("  {}", line);
        }

        Ok(DownloadResult {
            strategy: self.name(),
            url: request.url.to_string(),
            path: report.path,
        })
    }
}

/// Lines of interest from a successful yt-dlp run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct OutputReport {
    /// Trimmed destination / merge / already-downloaded lines, in order.
    pub lines: Vec<String>,
    /// Final file: the merge target if any, else the last destination,
    /// else the already-downloaded file.
    pub path: Option<PathBuf>,
}

impl OutputReport {
    #[must_use]
    pub fn parse(stdout: &str) -> Self {
        let mut lines = Vec::new();
        let mut merged = None;
        let mut destination = None;
        let mut existing = None;

        for raw in stdout.lines() {
            let line = raw.trim();

            if let Some(rest) = line.split_once("Destination:").map(|(_, r)| r.trim()) {
                destination = Some(PathBuf::from(rest));
            } else if line.contains("Merging") {
                if let Some(target) = quoted(line) {
                    merged = Some(PathBuf::from(target));
                }
            } else if let Some(head) = line.strip_suffix("has already been downloaded") {
                let file = head.trim_end();
                let file = file.split_once("] ").map_or(file, |(_, f)| f);
                existing = Some(PathBuf::from(file));
            } else {
                continue;
            }

            lines.push(line.to_string());
        }

        Self {
            lines,
            path: merged.or(destination).or(existing),
        }
    }
}

fn quoted(line: &str) -> Option<&str> {
    let start = line.find('"')? + 1;
    let len = line[start..].find('"')?;
    Some(&line[start..start + len])
}
