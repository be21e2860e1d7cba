//! Structural pass over the parsed document.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{Candidate, SourceKind};

/// Host fragments that make an `<iframe>` worth trying.
pub const EMBED_HOSTS: &[&str] = &["vimeo", "youtube", "wistia", "vidyard", "brightcove", "loom"];

/// `<video src>` and every nested `<source src>`, resolved against `base_url`.
///
/// For each `<video>` its own `src` comes first, then its sources in
/// document order.
#[must_use]
pub fn video_elements(document: &Html, base_url: &str) -> Vec<Candidate> {
    let (Ok(video_sel), Ok(source_sel)) = (Selector::parse("video"), Selector::parse("source"))
    else {
        return Vec::new();
    };

    let base = Url::parse(base_url).ok();
    let mut found = Vec::new();

    for video in document.select(&video_sel) {
        if let Some(src) = non_empty_attr(&video, "src") {
            found.push(Candidate::new(SourceKind::VideoElement, resolve(base.as_ref(), src)));
        }
        for source in video.select(&source_sel) {
            if let Some(src) = non_empty_attr(&source, "src") {
                found.push(Candidate::new(SourceKind::VideoSource, resolve(base.as_ref(), src)));
            }
        }
    }

    found
}

/// `<iframe>` embeds whose `src` (or lazy-loaded `data-src`) names a known
/// video host. Embed URLs are taken verbatim.
#[must_use]
pub fn iframe_embeds(document: &Html) -> Vec<Candidate> {
    let Ok(iframe_sel) = Selector::parse("iframe") else {
        return Vec::new();
    };

    document
        .select(&iframe_sel)
        .filter_map(|iframe| {
            non_empty_attr(&iframe, "src").or_else(|| non_empty_attr(&iframe, "data-src"))
        })
        .filter(|src| {
            let lower = src.to_lowercase();
            EMBED_HOSTS.iter().any(|host| lower.contains(host))
        })
        .map(|src| Candidate::new(SourceKind::IframeEmbed, src))
        .collect()
}

fn non_empty_attr<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name).filter(|v| !v.is_empty())
}

/// Join `src` onto the page URL; keep it as-is when that isn't possible.
fn resolve(base: Option<&Url>, src: &str) -> String {
    base.and_then(|b| b.join(src).ok())
        .map_or_else(|| src.to_string(), String::from)
}
