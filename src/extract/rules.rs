//! Text pattern rules applied to the raw document.
//!
//! Each rule is one regex plus a rewrite of its first capture group into a
//! candidate URL. Rules run in table order; that order is part of the retry
//! priority, so new rules go where they should rank, not at the end.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::{Candidate, SourceKind};

/// How a captured value becomes a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rewrite {
    /// Substitute the capture for `{id}` in a canonical URL.
    Template(&'static str),
    /// Use the capture as the URL, undoing JS/JSON slash escaping.
    UnescapeSlashes,
}

impl Rewrite {
    fn apply(self, captured: &str) -> String {
        match self {
            Self::Template(template) => template.replace("{id}", captured),
            Self::UnescapeSlashes => unescape_slashes(captured),
        }
    }
}

/// A single independently testable extraction rule.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub name: &'static str,
    pub kind: SourceKind,
    regex: Regex,
    rewrite: Rewrite,
}

impl PatternRule {
    pub fn new(
        name: &'static str,
        kind: SourceKind,
        pattern: &str,
        rewrite: Rewrite,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            kind,
            regex: Regex::new(pattern)?,
            rewrite,
        })
    }

    /// Candidates for every distinct capture, in order of first match.
    #[must_use]
    pub fn apply(&self, text: &str) -> Vec<Candidate> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        for cap in self.regex.captures_iter(text) {
            let Some(m) = cap.get(1) else { continue };
            if !seen.insert(m.as_str()) {
                continue;
            }
            found.push(Candidate::new(self.kind, self.rewrite.apply(m.as_str())));
        }

        found
    }
}

const WISTIA_IFRAME: Rewrite = Rewrite::Template("https://fast.wistia.net/embed/iframe/{id}");
const VIMEO_PLAYER: Rewrite = Rewrite::Template("https://player.vimeo.com/video/{id}");
const YOUTUBE_WATCH: Rewrite = Rewrite::Template("https://www.youtube.com/watch?v={id}");

/// Built-in rules in priority order.
pub static RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    let table: [(&'static str, SourceKind, &str, Rewrite); 9] = [
        // Wistia: async embed class, embed URL, JSON media payload
        ("wistia_async", SourceKind::Wistia, r"wistia_async_([a-zA-Z0-9]+)", WISTIA_IFRAME),
        (
            "wistia_embed_url",
            SourceKind::Wistia,
            r"//fast\.wistia\.(?:com|net)/embed/(?:iframe|medias)/([a-zA-Z0-9]+)",
            WISTIA_IFRAME,
        ),
        ("wistia_hashed_id", SourceKind::Wistia, r#""hashedId"\s*:\s*"([a-zA-Z0-9]+)""#, WISTIA_IFRAME),
        // Vimeo: player URL, then bare vimeo.com/{id}
        ("vimeo_player", SourceKind::Vimeo, r"player\.vimeo\.com/video/(\d+)", VIMEO_PLAYER),
        ("vimeo_page", SourceKind::Vimeo, r"vimeo\.com/(\d+)", VIMEO_PLAYER),
        // YouTube: embed, watch, short link
        ("youtube_embed", SourceKind::Youtube, r"youtube\.com/embed/([a-zA-Z0-9_-]+)", YOUTUBE_WATCH),
        ("youtube_watch", SourceKind::Youtube, r"youtube\.com/watch\?v=([a-zA-Z0-9_-]+)", YOUTUBE_WATCH),
        ("youtube_short", SourceKind::Youtube, r"youtu\.be/([a-zA-Z0-9_-]+)", YOUTUBE_WATCH),
        // Any absolute media file URL in markup or scripts
        (
            "direct_file",
            SourceKind::DirectFile,
            r#"(?i)(https?://[^\s"'<>]+\.(?:mp4|m3u8|webm)(?:\?[^\s"'<>]*)?)"#,
            Rewrite::UnescapeSlashes,
        ),
    ];

    table
        .into_iter()
        .map(|(name, kind, pattern, rewrite)| {
            PatternRule::new(name, kind, pattern, rewrite).expect("built-in pattern must compile")
        })
        .collect()
});

/// Undo `\u002F` and `\/` slash escaping found in inline JSON.
#[must_use]
pub fn unescape_slashes(url: &str) -> String {
    url.replace("\\u002F", "/").replace("\\/", "/")
}
