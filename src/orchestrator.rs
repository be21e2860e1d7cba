//! Fallback chain from an input URL to a downloaded file.
//!
//! ```text
//! input ──► direct video URL? ──yes──► direct-input chain ──► Success / Failure
//!               │ no
//!               ▼
//!          page-URL chain (yt-dlp on the page) ──ok──► Success
//!               │ failed
//!               ▼
//!          fetch page ──error──► Failure (manual instructions)
//!               ▼
//!          extract candidates ──► candidate chain per candidate ──first ok──► Success
//!               │ none succeeded
//!               ▼
//!          Failure (manual instructions)
//! ```
//!
//! Each chain is an ordered table of `(UrlRule, strategy)` steps rather than
//! hard-coded branches, so the fallback order is data and tests can swap in
//! their own strategies.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::classify::{
    has_extension, is_direct_video_url, CANDIDATE_FILE_EXTENSIONS, DIRECT_INPUT_FILE_EXTENSIONS,
};
use crate::config::Config;
use crate::download::{
    DirectDownloader, DownloadRequest, DownloadResult, DownloadStrategy, ExternalDownloader,
    ProgressCallback,
};
use crate::error::Result;
use crate::extract::Extractor;
use crate::http_client::{PageClient, PageSource};

/// Predicate deciding whether a chain step applies to a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlRule {
    /// Every URL.
    Any,
    /// URLs containing one of these extensions (case-insensitive).
    Extension(&'static [&'static str]),
}

impl UrlRule {
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Extension(exts) => has_extension(url, exts),
        }
    }
}

/// One `(predicate, action)` row of a chain.
#[derive(Clone)]
pub struct ChainStep {
    pub when: UrlRule,
    pub strategy: Arc<dyn DownloadStrategy>,
    pub verbose: bool,
}

impl ChainStep {
    pub fn new(when: UrlRule, strategy: Arc<dyn DownloadStrategy>) -> Self {
        Self {
            when,
            strategy,
            verbose: false,
        }
    }

    #[must_use]
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}

/// Ordered strategies tried against a single URL. First success wins.
#[derive(Clone, Default)]
pub struct Chain {
    steps: Vec<ChainStep>,
}

impl Chain {
    #[must_use]
    pub fn new(steps: Vec<ChainStep>) -> Self {
        Self { steps }
    }

    /// Run applicable steps in order. Step failures are logged, not returned.
    pub async fn run(&self, url: &str, output_dir: &Path) -> Option<DownloadResult> {
        for step in self.steps.iter().filter(|s| s.when.matches(url)) {
            let request = DownloadRequest::new(url, output_dir).verbose(step.verbose);
            info!("  Attempting ({}): {}", step.strategy.name(), truncate(url, 70));

            match step.strategy.download(&request).await {
                Ok(result) => {
                    info!("  SUCCESS via {}", result.strategy);
                    return Some(result);
                }
                Err(err) => warn!("  {} failed: {}", step.strategy.name(), err),
            }
        }
        None
    }
}

/// Why a run ended without a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The input was a video URL and every applicable strategy failed.
    DirectUrlFailed,
    /// The page could not be retrieved.
    FetchFailed(String),
    /// The page was fetched but no candidate could be downloaded.
    NoCandidateSucceeded,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectUrlFailed => f.write_str("every strategy failed for the video URL"),
            Self::FetchFailed(err) => write!(f, "could not fetch page: {err}"),
            Self::NoCandidateSucceeded => f.write_str("no video source could be downloaded"),
        }
    }
}

/// Terminal state of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(DownloadResult),
    Failure(FailureReason),
}

/// Everything the caller needs to report a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub url: String,
    pub outcome: Outcome,
    /// Candidates extracted from the page; `None` if extraction never ran.
    pub candidates_found: Option<usize>,
    /// Candidates handed to the candidate chain.
    pub candidates_tried: usize,
    /// Small body with scripts: the video is probably injected client-side.
    pub likely_client_rendered: bool,
}

impl RunReport {
    fn new(url: &str, outcome: Outcome) -> Self {
        Self {
            url: url.to_string(),
            outcome,
            candidates_found: None,
            candidates_tried: 0,
            likely_client_rendered: false,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    /// Manual instructions follow a fetch failure or an exhausted candidate
    /// list, not a failed direct video URL.
    #[must_use]
    pub fn needs_manual_instructions(&self) -> bool {
        matches!(
            self.outcome,
            Outcome::Failure(FailureReason::FetchFailed(_) | FailureReason::NoCandidateSucceeded)
        )
    }

    /// Process exit status: 0 on success, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        u8::from(!self.is_success())
    }
}

/// Tunables for a run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub output_dir: PathBuf,
    pub try_page_url_first: bool,
    pub spa_threshold_bytes: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        let config = Config::default();
        Self {
            output_dir: config.output_dir,
            try_page_url_first: config.try_page_url_first,
            spa_threshold_bytes: config.spa_threshold_bytes,
        }
    }
}

/// Sequences classification, fetching, extraction and the download chains.
pub struct Orchestrator {
    page_source: Arc<dyn PageSource>,
    extractor: Extractor,
    direct_input: Chain,
    page_url: Chain,
    candidate: Chain,
    settings: RunSettings,
}

impl Orchestrator {
    /// Build the standard chains around the given collaborators.
    ///
    /// - direct input: `external` (verbose), then `direct` for `.mp4/.webm/.mov`
    /// - page URL: `external`
    /// - candidates: `external`, then `direct` for `.mp4/.webm`
    pub fn new(
        page_source: Arc<dyn PageSource>,
        external: Arc<dyn DownloadStrategy>,
        direct: Arc<dyn DownloadStrategy>,
        settings: RunSettings,
    ) -> Self {
        let direct_input = Chain::new(vec![
            ChainStep::new(UrlRule::Any, Arc::clone(&external)).verbose(),
            ChainStep::new(UrlRule::Extension(DIRECT_INPUT_FILE_EXTENSIONS), Arc::clone(&direct)),
        ]);
        let page_url = Chain::new(vec![ChainStep::new(UrlRule::Any, Arc::clone(&external))]);
        let candidate = Chain::new(vec![
            ChainStep::new(UrlRule::Any, external),
            ChainStep::new(UrlRule::Extension(CANDIDATE_FILE_EXTENSIONS), direct),
        ]);

        Self {
            page_source,
            extractor: Extractor::new(),
            direct_input,
            page_url,
            candidate,
            settings,
        }
    }

    /// Wire real collaborators from configuration.
    pub fn from_config(config: &Config, progress: Option<ProgressCallback>) -> Result<Self> {
        let page_source = PageClient::with_timeout(config.http.page_timeout())?;
        let external = ExternalDownloader::new()
            .with_binary_path(&config.downloader.binary)
            .with_extra_args(config.downloader.extra_args.clone());
        let mut direct = DirectDownloader::with_timeout(config.http.download_timeout())?;
        if let Some(cb) = progress {
            direct = direct.with_progress(cb);
        }

        let settings = RunSettings {
            output_dir: config.output_dir.clone(),
            try_page_url_first: config.try_page_url_first,
            spa_threshold_bytes: config.spa_threshold_bytes,
        };

        Ok(Self::new(
            Arc::new(page_source),
            Arc::new(external),
            Arc::new(direct),
            settings,
        ))
    }

    /// Replace the extractor (e.g. one with extra rules).
    #[must_use]
    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Drive one URL to a terminal state.
    pub async fn run(&self, url: &str) -> RunReport {
        let output_dir = self.settings.output_dir.as_path();

        if is_direct_video_url(url) {
            info!("[Direct Video URL Detected]");
            let outcome = match self.direct_input.run(url, output_dir).await {
                Some(result) => Outcome::Success(result),
                None => Outcome::Failure(FailureReason::DirectUrlFailed),
            };
            return RunReport::new(url, outcome);
        }

        if self.settings.try_page_url_first {
            info!("[1/3] Trying yt-dlp extraction on the page...");
            if let Some(result) = self.page_url.run(url, output_dir).await {
                return RunReport::new(url, Outcome::Success(result));
            }
            info!("  yt-dlp could not extract video from page");
        }

        info!("[2/3] Fetching page content...");
        let html = match self.page_source.fetch_page(url).await {
            Ok(html) => html,
            Err(err) => {
                warn!("  {}", err);
                return RunReport::new(
                    url,
                    Outcome::Failure(FailureReason::FetchFailed(err.to_string())),
                );
            }
        };
        info!("  Fetched {} bytes", html.len());

        let likely_client_rendered =
            html.len() < self.settings.spa_threshold_bytes && html.contains("<script");
        if likely_client_rendered {
            warn!("  Page appears to be a JavaScript single-page application");
            warn!("  Video content is likely loaded dynamically via JavaScript");
        }

        info!("[3/3] Searching for video URLs in HTML...");
        let candidates = self.extractor.extract(&html, url);
        info!("  Found {} potential source(s)", candidates.len());

        let mut report = RunReport::new(url, Outcome::Failure(FailureReason::NoCandidateSucceeded));
        report.candidates_found = Some(candidates.len());
        report.likely_client_rendered = likely_client_rendered;

        for candidate in &candidates {
            report.candidates_tried += 1;
            info!("  Trying [{}]: {}", candidate.kind, truncate(&candidate.url, 60));

            if let Some(result) = self.candidate.run(&candidate.url, output_dir).await {
                report.outcome = Outcome::Success(result);
                break;
            }
        }

        report
    }
}

/// First `max` characters of `s`, with `...` appended when cut.
#[must_use]
pub fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VidgrabError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records every request and succeeds for URLs matching `succeed_for`.
    struct MockStrategy {
        name: &'static str,
        succeed_for: Vec<String>,
        calls: Mutex<Vec<(String, bool)>>,
    }

    impl MockStrategy {
        fn new(name: &'static str, succeed_for: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                name,
                succeed_for: succeed_for.iter().map(|s| (*s).to_string()).collect(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, bool)> {
            self.calls.lock().unwrap().clone()
        }

        fn urls(&self) -> Vec<String> {
            self.calls().into_iter().map(|(u, _)| u).collect()
        }
    }

    #[async_trait]
    impl DownloadStrategy for MockStrategy {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn download(&self, request: &DownloadRequest<'_>) -> Result<DownloadResult> {
            self.calls
                .lock()
                .unwrap()
                .push((request.url.to_string(), request.verbose));

            if self.succeed_for.iter().any(|u| u == request.url) {
                Ok(DownloadResult {
                    strategy: self.name,
                    url: request.url.to_string(),
                    path: Some(request.output_dir.join("video.mp4")),
                })
            } else {
                Err(VidgrabError::ExternalTool {
                    tool: self.name.to_string(),
                    status: "exit status: 1".to_string(),
                })
            }
        }
    }

    struct MockPage {
        body: Option<String>,
        fetches: AtomicUsize,
    }

    impl MockPage {
        fn serving(body: &str) -> Arc<Self> {
            Arc::new(Self {
                body: Some(body.to_string()),
                fetches: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                body: None,
                fetches: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PageSource for MockPage {
        async fn fetch_page(&self, _url: &str) -> Result<String> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.body
                .clone()
                .ok_or_else(|| VidgrabError::Io(std::io::Error::other("connection refused")))
        }
    }

    const PAGE: &str = "https://example.com/promo";

    fn settings(try_page_url_first: bool) -> RunSettings {
        RunSettings {
            output_dir: PathBuf::from("downloads"),
            try_page_url_first,
            spa_threshold_bytes: 5000,
        }
    }

    fn orchestrator(
        page: &Arc<MockPage>,
        external: &Arc<MockStrategy>,
        direct: &Arc<MockStrategy>,
        try_page_url_first: bool,
    ) -> Orchestrator {
        Orchestrator::new(
            Arc::clone(page) as Arc<dyn PageSource>,
            Arc::clone(external) as Arc<dyn DownloadStrategy>,
            Arc::clone(direct) as Arc<dyn DownloadStrategy>,
            settings(try_page_url_first),
        )
    }

    const TWO_EMBEDS: &str = r#"<html><body>
        <iframe src="https://player.vimeo.com/video/111"></iframe>
        <iframe src="https://www.youtube.com/embed/abc"></iframe>
    </body></html>"#;

    #[tokio::test]
    async fn test_first_successful_candidate_stops_the_loop() {
        let page = MockPage::serving(TWO_EMBEDS);
        let external = MockStrategy::new("yt-dlp", &["https://player.vimeo.com/video/111"]);
        let direct = MockStrategy::new("direct", &[]);

        let report = orchestrator(&page, &external, &direct, false).run(PAGE).await;

        assert!(report.is_success());
        assert_eq!(external.calls().len(), 1);
        assert_eq!(external.urls(), vec!["https://player.vimeo.com/video/111"]);
        assert_eq!(report.candidates_found, Some(3));
        assert_eq!(report.candidates_tried, 1);
        assert!(direct.calls().is_empty());
    }

    #[tokio::test]
    async fn test_page_url_attempt_precedes_fetch() {
        let page = MockPage::serving(TWO_EMBEDS);
        let external = MockStrategy::new("yt-dlp", &[PAGE]);
        let direct = MockStrategy::new("direct", &[]);

        let report = orchestrator(&page, &external, &direct, true).run(PAGE).await;

        assert!(report.is_success());
        assert_eq!(external.urls(), vec![PAGE]);
        assert_eq!(page.fetches.load(Ordering::SeqCst), 0);
        assert_eq!(report.candidates_found, None);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_terminal() {
        let page = MockPage::failing();
        let external = MockStrategy::new("yt-dlp", &[]);
        let direct = MockStrategy::new("direct", &[]);

        let report = orchestrator(&page, &external, &direct, true).run(PAGE).await;

        assert!(matches!(
            report.outcome,
            Outcome::Failure(FailureReason::FetchFailed(_))
        ));
        assert!(report.needs_manual_instructions());
        assert_eq!(report.candidates_found, None);
        assert_eq!(external.urls(), vec![PAGE]);
        assert!(direct.calls().is_empty());
        assert_eq!(report.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_direct_url_falls_back_to_stream() {
        let url = "https://cdn.example.com/v/clip.MP4";
        let page = MockPage::failing();
        let external = MockStrategy::new("yt-dlp", &[]);
        let direct = MockStrategy::new("direct", &[url]);

        let report = orchestrator(&page, &external, &direct, true).run(url).await;

        assert!(report.is_success());
        assert_eq!(report.exit_code(), 0);
        assert_eq!(external.calls(), vec![(url.to_string(), true)]);
        assert_eq!(direct.urls(), vec![url]);
        assert_eq!(page.fetches.load(Ordering::SeqCst), 0);
        match report.outcome {
            Outcome::Success(result) => assert_eq!(result.strategy, "direct"),
            Outcome::Failure(reason) => panic!("unexpected failure: {reason:?}"),
        }
    }

    #[tokio::test]
    async fn test_direct_hls_url_skips_stream_and_fails_quietly() {
        let url = "https://cdn.example.com/live/master.m3u8";
        let page = MockPage::failing();
        let external = MockStrategy::new("yt-dlp", &[]);
        let direct = MockStrategy::new("direct", &[url]);

        let report = orchestrator(&page, &external, &direct, true).run(url).await;

        assert_eq!(report.outcome, Outcome::Failure(FailureReason::DirectUrlFailed));
        assert!(!report.needs_manual_instructions());
        assert!(direct.calls().is_empty());
    }

    #[tokio::test]
    async fn test_candidate_stream_fallback_only_for_mp4_and_webm() {
        let html = r#"
            <video src="https://cdn.example.com/a.mov"></video>
            <video src="https://cdn.example.com/b.webm"></video>
        "#;
        let page = MockPage::serving(html);
        let external = MockStrategy::new("yt-dlp", &[]);
        let direct = MockStrategy::new("direct", &["https://cdn.example.com/b.webm"]);

        let report = orchestrator(&page, &external, &direct, false).run(PAGE).await;

        assert!(report.is_success());
        assert_eq!(direct.urls(), vec!["https://cdn.example.com/b.webm"]);
        assert_eq!(
            external.urls(),
            vec!["https://cdn.example.com/a.mov", "https://cdn.example.com/b.webm"]
        );
        assert_eq!(report.candidates_tried, 2);
    }

    #[tokio::test]
    async fn test_empty_page_needs_manual_instructions() {
        let page = MockPage::serving("<html><head><script src=\"/app.js\"></script></head><body><div id=\"root\"></div></body></html>");
        let external = MockStrategy::new("yt-dlp", &[]);
        let direct = MockStrategy::new("direct", &[]);

        let report = orchestrator(&page, &external, &direct, true).run(PAGE).await;

        assert_eq!(report.outcome, Outcome::Failure(FailureReason::NoCandidateSucceeded));
        assert!(report.needs_manual_instructions());
        assert!(report.likely_client_rendered);
        assert_eq!(report.candidates_found, Some(0));
        assert_eq!(page.fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_url_rule() {
        assert!(UrlRule::Any.matches("anything"));
        assert!(UrlRule::Extension(&[".mp4"]).matches("https://x/A.MP4"));
        assert!(!UrlRule::Extension(&[".mp4"]).matches("https://x/a.mov"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 70), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("ééé", 2), "éé...");
    }
}
