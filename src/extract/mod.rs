//! Video reference extraction from raw page text.
//!
//! Discovery runs in a fixed order and that order is the retry priority:
//!
//! 1. `<video src>` and nested `<source src>` (resolved against the page URL)
//! 2. `<iframe src|data-src>` pointing at a known video host
//! 3. Wistia, Vimeo and `YouTube` ID patterns, rewritten to canonical URLs
//! 4. Bare `.mp4` / `.m3u8` / `.webm` URLs anywhere in the HTML or JS
//!
//! Everything lands in one [`CandidateList`], which drops repeated URLs and
//! keeps the first occurrence. Extraction is pure: no I/O, no failure modes.
//!
//! # Example
//!
//! ```rust
//! use vidgrab::extract::{Extractor, SourceKind};
//!
//! let html = r#"<script>wistia_async_abc123</script>"#;
//! let candidates = Extractor::new().extract(html, "https://example.com/");
//!
//! let first = &candidates.as_slice()[0];
//! assert_eq!(first.kind, SourceKind::Wistia);
//! assert_eq!(first.url, "https://fast.wistia.net/embed/iframe/abc123");
//! ```

pub mod dom;
pub mod rules;

use std::collections::HashSet;
use std::fmt;

use scraper::Html;

pub use rules::{PatternRule, RULES};

/// Where a candidate was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    VideoElement,
    VideoSource,
    IframeEmbed,
    Wistia,
    Vimeo,
    Youtube,
    DirectFile,
}

impl SourceKind {
    /// Snake-case tag used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VideoElement => "video_element",
            Self::VideoSource => "video_source",
            Self::IframeEmbed => "iframe_embed",
            Self::Wistia => "wistia",
            Self::Vimeo => "vimeo",
            Self::Youtube => "youtube",
            Self::DirectFile => "direct_file",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A possible video location discovered on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub kind: SourceKind,
    pub url: String,
}

impl Candidate {
    pub fn new(kind: SourceKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
        }
    }
}

/// Ordered candidates with unique URLs.
///
/// The first push of a URL wins; later pushes of the same URL are ignored
/// regardless of their kind.
#[derive(Debug, Clone, Default)]
pub struct CandidateList {
    items: Vec<Candidate>,
    seen: HashSet<String>,
}

impl CandidateList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unless the URL is already present. Returns `true` if added.
    pub fn push(&mut self, candidate: Candidate) -> bool {
        if self.seen.contains(&candidate.url) {
            return false;
        }
        self.seen.insert(candidate.url.clone());
        self.items.push(candidate);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Candidate] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.items.iter()
    }
}

impl Extend<Candidate> for CandidateList {
    fn extend<I: IntoIterator<Item = Candidate>>(&mut self, iter: I) {
        for candidate in iter {
            self.push(candidate);
        }
    }
}

impl FromIterator<Candidate> for CandidateList {
    fn from_iter<I: IntoIterator<Item = Candidate>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl IntoIterator for CandidateList {
    type Item = Candidate;
    type IntoIter = std::vec::IntoIter<Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a CandidateList {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Runs the DOM pass followed by the pattern rule table.
#[derive(Debug, Clone)]
pub struct Extractor {
    rules: Vec<PatternRule>,
}

impl Extractor {
    /// Extractor with the built-in rule table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: RULES.clone(),
        }
    }

    /// Extractor with a custom rule table (still preceded by the DOM pass).
    #[must_use]
    pub fn with_rules(rules: Vec<PatternRule>) -> Self {
        Self { rules }
    }

    /// Collect every candidate in priority order.
    #[must_use]
    pub fn extract(&self, html: &str, base_url: &str) -> CandidateList {
        let mut list = CandidateList::new();

        let document = Html::parse_document(html);
        list.extend(dom::video_elements(&document, base_url));
        list.extend(dom::iframe_embeds(&document));

        for rule in &self.rules {
            list.extend(rule.apply(html));
        }

        list
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}
